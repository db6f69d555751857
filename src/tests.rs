#[cfg(test)]
mod tests {

    mod filter_tests {
        use crate::services::filter::{parse_flag, parse_id_list, PostingFilter};

        #[test]
        fn test_parse_id_list_basic() {
            assert_eq!(parse_id_list("1,2,3").unwrap(), vec![1, 2, 3]);
        }

        #[test]
        fn test_parse_id_list_dedups_and_sorts() {
            assert_eq!(parse_id_list("3,1,3").unwrap(), vec![1, 3]);
        }

        #[test]
        fn test_parse_id_list_tolerates_spaces() {
            assert_eq!(parse_id_list(" 4 , 5").unwrap(), vec![4, 5]);
        }

        #[test]
        fn test_parse_id_list_rejects_words() {
            assert!(parse_id_list("1,two").is_err());
        }

        #[test]
        fn test_parse_id_list_rejects_empty_token() {
            assert!(parse_id_list("1,,2").is_err());
        }

        #[test]
        fn test_parse_flag() {
            assert!(!parse_flag(None).unwrap());
            assert!(!parse_flag(Some("")).unwrap());
            assert!(!parse_flag(Some("0")).unwrap());
            assert!(parse_flag(Some("1")).unwrap());
            assert!(parse_flag(Some("2")).unwrap());
            assert!(parse_flag(Some("yes")).is_err());
        }

        #[test]
        fn test_filter_from_query_empty_means_no_filter() {
            let filter = PostingFilter::from_query(Some(""), None).unwrap();
            assert_eq!(filter, PostingFilter::default());
        }

        #[test]
        fn test_filter_from_query_reports_each_field() {
            let errors = PostingFilter::from_query(Some("x"), Some("1,y")).unwrap_err();
            assert!(errors.contains("tags"));
            assert!(errors.contains("steps"));
        }

        #[test]
        fn test_filter_sql_clauses_param_order() {
            let filter = PostingFilter {
                tags: Some(vec![1, 2]),
                steps: Some(vec![9]),
            };
            let (sql, params) = filter.sql_clauses();
            assert_eq!(params, vec![1, 2, 9]);
            assert!(sql.contains("posting_tags"));
            assert!(sql.contains("posting_steps"));
            assert_eq!(sql.matches('?').count(), 3);
        }

        #[test]
        fn test_filter_sql_clauses_empty() {
            let (sql, params) = PostingFilter::default().sql_clauses();
            assert!(sql.is_empty());
            assert!(params.is_empty());
        }
    }

    mod payload_tests {
        use crate::models::{AttrPayload, PostingPayload, WriteMode, NOT_BLANK, NOT_NULL, REQUIRED};

        fn payload(json: serde_json::Value) -> PostingPayload {
            serde_json::from_value(json).unwrap()
        }

        #[test]
        fn test_create_requires_title_and_minutes() {
            let errors = payload(serde_json::json!({})).validate_new().unwrap_err();
            assert_eq!(errors.get("title"), Some(&[REQUIRED.to_string()][..]));
            assert_eq!(errors.get("time_minutes"), Some(&[REQUIRED.to_string()][..]));
        }

        #[test]
        fn test_create_defaults_optional_fields() {
            let new = payload(serde_json::json!({"title": "Soup", "time_minutes": 20}))
                .validate_new()
                .unwrap();
            assert_eq!(new.title, "Soup");
            assert_eq!(new.description, "");
            assert_eq!(new.link, "");
            assert!(new.tags.is_empty());
            assert!(new.steps.is_empty());
        }

        #[test]
        fn test_partial_allows_missing_fields() {
            let changes = payload(serde_json::json!({"title": "New"}))
                .validate(WriteMode::Partial)
                .unwrap();
            assert_eq!(changes.title.as_deref(), Some("New"));
            assert!(changes.time_minutes.is_none());
            assert!(changes.tags.is_none());
        }

        #[test]
        fn test_replace_requires_core_fields() {
            let errors = payload(serde_json::json!({"title": "New"}))
                .validate(WriteMode::Replace)
                .unwrap_err();
            assert!(errors.contains("time_minutes"));
            assert!(!errors.contains("title"));
        }

        #[test]
        fn test_null_is_rejected() {
            let errors = payload(serde_json::json!({"tags": null}))
                .validate(WriteMode::Partial)
                .unwrap_err();
            assert_eq!(errors.get("tags"), Some(&[NOT_NULL.to_string()][..]));
        }

        #[test]
        fn test_empty_tags_is_present() {
            let changes = payload(serde_json::json!({"tags": []}))
                .validate(WriteMode::Partial)
                .unwrap();
            assert_eq!(changes.tags, Some(vec![]));
        }

        #[test]
        fn test_user_and_id_fields_ignored() {
            let changes = payload(serde_json::json!({"user": 42, "id": 7, "title": "T"}))
                .validate(WriteMode::Partial)
                .unwrap();
            assert_eq!(changes.title.as_deref(), Some("T"));
        }

        #[test]
        fn test_nested_names_trimmed_and_extra_keys_ignored() {
            let changes = payload(serde_json::json!({
                "steps": [{"name": "  Boil ", "image": "x.png", "id": 3}]
            }))
            .validate(WriteMode::Partial)
            .unwrap();
            assert_eq!(changes.steps, Some(vec!["Boil".to_string()]));
        }

        #[test]
        fn test_nested_blank_name_keyed_by_index() {
            let errors = payload(serde_json::json!({"tags": [{"name": "ok"}, {"name": " "}]}))
                .validate(WriteMode::Partial)
                .unwrap_err();
            assert_eq!(errors.get("tags[1].name"), Some(&[NOT_BLANK.to_string()][..]));
        }

        #[test]
        fn test_nested_missing_name() {
            let errors = payload(serde_json::json!({"tags": [{}]}))
                .validate(WriteMode::Partial)
                .unwrap_err();
            assert!(errors.contains("tags[0].name"));
        }

        #[test]
        fn test_negative_minutes_rejected() {
            let errors = payload(serde_json::json!({"time_minutes": -1}))
                .validate(WriteMode::Partial)
                .unwrap_err();
            assert!(errors.contains("time_minutes"));
        }

        #[test]
        fn test_title_too_long() {
            let errors = payload(serde_json::json!({"title": "a".repeat(256)}))
                .validate(WriteMode::Partial)
                .unwrap_err();
            assert!(errors.contains("title"));
        }

        #[test]
        fn test_link_validation() {
            let ok = payload(serde_json::json!({"link": "https://example.com/r.pdf"}))
                .validate(WriteMode::Partial)
                .unwrap();
            assert_eq!(ok.link.as_deref(), Some("https://example.com/r.pdf"));

            let empty = payload(serde_json::json!({"link": ""}))
                .validate(WriteMode::Partial)
                .unwrap();
            assert_eq!(empty.link.as_deref(), Some(""));

            let errors = payload(serde_json::json!({"link": "not a url"}))
                .validate(WriteMode::Partial)
                .unwrap_err();
            assert!(errors.contains("link"));

            let errors = payload(serde_json::json!({"link": "ftp://example.com/x"}))
                .validate(WriteMode::Partial)
                .unwrap_err();
            assert!(errors.contains("link"));
        }

        #[test]
        fn test_attr_payload_modes() {
            let full: AttrPayload = serde_json::from_value(serde_json::json!({})).unwrap();
            assert!(full.validate(false).unwrap_err().contains("name"));

            let partial: AttrPayload = serde_json::from_value(serde_json::json!({})).unwrap();
            assert_eq!(partial.validate(true).unwrap(), None);

            let named: AttrPayload =
                serde_json::from_value(serde_json::json!({"name": " Dinner "})).unwrap();
            assert_eq!(named.validate(true).unwrap().as_deref(), Some("Dinner"));
        }
    }

    mod model_tests {
        use crate::models::{FieldErrors, Step};

        #[test]
        fn test_step_with_url_prefix() {
            let step = Step {
                id: 1,
                name: "Chop".to_string(),
                image: Some("steps/a.png".to_string()),
            };
            assert_eq!(
                step.with_url_prefix("/media/").image.as_deref(),
                Some("/media/steps/a.png")
            );
        }

        #[test]
        fn test_step_without_image_stays_null() {
            let step = Step {
                id: 1,
                name: "Chop".to_string(),
                image: None,
            };
            assert_eq!(step.with_url_prefix("/media").image, None);
        }

        #[test]
        fn test_field_errors_serialize_as_map() {
            let mut errors = FieldErrors::new();
            errors.add("name", "first");
            errors.add("name", "second");
            let json = serde_json::to_value(&errors).unwrap();
            assert_eq!(json, serde_json::json!({"name": ["first", "second"]}));
        }
    }

    mod auth_tests {
        use crate::services::auth::{hash_password, normalize_email, verify_password};

        #[test]
        fn test_hash_password_produces_hash() {
            let hash = hash_password("Password123").unwrap();
            assert!(hash.starts_with("$argon2"));
        }

        #[test]
        fn test_hash_password_rejects_weak() {
            assert!(hash_password("short").is_err());
            assert!(hash_password("alllowercase1").is_err());
        }

        #[test]
        fn test_verify_password() {
            let hash = hash_password("Password123").unwrap();
            assert!(verify_password("Password123", &hash));
            assert!(!verify_password("Password124", &hash));
        }

        #[test]
        fn test_verify_password_invalid_hash() {
            assert!(!verify_password("Password123", "not-a-hash"));
        }

        #[test]
        fn test_normalize_email() {
            assert_eq!(normalize_email(" Cook@Example.COM "), "Cook@example.com");
        }
    }

    mod token_header_tests {
        use crate::web::request_token;
        use axum::http::{header, HeaderMap, HeaderValue};

        fn headers(value: &'static str) -> HeaderMap {
            let mut headers = HeaderMap::new();
            headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
            headers
        }

        #[test]
        fn test_bearer_scheme() {
            assert_eq!(request_token(&headers("Bearer pt_abc")).as_deref(), Some("pt_abc"));
        }

        #[test]
        fn test_token_scheme() {
            assert_eq!(request_token(&headers("Token pt_abc")).as_deref(), Some("pt_abc"));
        }

        #[test]
        fn test_other_scheme_ignored() {
            assert_eq!(request_token(&headers("Basic dXNlcjpwYXNz")), None);
        }

        #[test]
        fn test_missing_header() {
            assert_eq!(request_token(&HeaderMap::new()), None);
        }
    }

    mod config_tests {
        use crate::config::parse_size;
        use crate::Config;
        use std::path::Path;

        #[test]
        fn test_parse_size_units() {
            assert_eq!(parse_size("10MB").unwrap(), 10 * 1024 * 1024);
            assert_eq!(parse_size("512kb").unwrap(), 512 * 1024);
            assert_eq!(parse_size("1GB").unwrap(), 1024 * 1024 * 1024);
            assert_eq!(parse_size("100").unwrap(), 100);
            assert_eq!(parse_size("100B").unwrap(), 100);
        }

        #[test]
        fn test_parse_size_invalid() {
            assert!(parse_size("lots").is_err());
            assert!(parse_size("MB").is_err());
        }

        #[test]
        fn test_config_load_missing_file() {
            let result = Config::load(Path::new("/nonexistent/path.toml"));
            assert!(result.is_err());
        }

        #[test]
        fn test_config_load_valid_toml() {
            use std::io::Write;
            let temp_dir = std::env::temp_dir();
            let config_path = temp_dir.join(format!("test_pantry_config_{}.toml", uuid::Uuid::new_v4()));

            let config_content = r#"
[server]
port = 4000

[database]
path = "data/pantry.db"

[media]
upload_dir = "uploads"
"#;

            let mut file = std::fs::File::create(&config_path).unwrap();
            file.write_all(config_content.as_bytes()).unwrap();

            let config = Config::load(&config_path).unwrap();
            assert_eq!(config.server.port, 4000);
            assert_eq!(config.server.host, "127.0.0.1");
            assert_eq!(config.database.pool_size, 10);
            assert_eq!(config.media.url_prefix, "/media");
            assert_eq!(config.media.max_upload_bytes().unwrap(), 10 * 1024 * 1024);
            assert_eq!(config.auth.token_lifetime_days, None);

            std::fs::remove_file(&config_path).ok();
        }

        #[test]
        fn test_config_rejects_bad_prefix() {
            let config: Config = toml::from_str(
                r#"
[database]
path = "db"

[media]
upload_dir = "uploads"
url_prefix = "media"
"#,
            )
            .unwrap();
            assert!(config.validate().is_err());
        }
    }
}
