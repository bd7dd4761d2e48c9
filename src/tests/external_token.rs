#[cfg(test)]
mod test {

    use serial_test::serial;

    use crate::errors::TokenError;
    use crate::helpers::time::now_i64;
    use crate::parser::jwt::sample_jwt;
    use crate::provider::TokenProvider;
    use crate::sources::external::ExternalTokenProvider;
    use crate::tests::common::json;
    use crate::utils::constants::EXTERNAL_TOKEN_ENVS;

    fn clear_env() {
        for name in EXTERNAL_TOKEN_ENVS {
            std::env::remove_var(name);
        }
    }

    fn jwt(exp: i64, sub: &str) -> String {
        sample_jwt(&json!({"exp": exp, "sub": sub, "realm": "Vince"}))
    }

    #[tokio::test]
    async fn configured_token_is_served_verbatim() {
        let token = jwt(now_i64() + 600, "configured");
        let provider = ExternalTokenProvider::new(Some(&token)).unwrap();

        assert_eq!(TokenProvider::token(&provider).await.unwrap(), token);
        assert_eq!(provider.claims().sub, "configured");
        assert!(matches!(
            TokenProvider::account_id(&provider).await,
            Err(TokenError::Unsupported(_))
        ));
    }

    #[tokio::test]
    #[serial]
    async fn env_variables_are_checked_in_order() {
        clear_env();
        std::env::set_var("APOCTL_TOKEN", jwt(now_i64() + 600, "apoctl"));
        std::env::set_var("ENFORCERD_TOKEN", jwt(now_i64() + 600, "enforcerd"));

        let provider = ExternalTokenProvider::from_env().unwrap();
        assert_eq!(provider.claims().sub, "apoctl");

        std::env::set_var("PRISMA_TOKEN", jwt(now_i64() + 600, "prisma"));
        let provider = ExternalTokenProvider::new(Some("")).unwrap();
        assert_eq!(provider.claims().sub, "prisma");

        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn expired_env_token_is_refused() {
        clear_env();
        std::env::set_var("PRISMA_TOKEN", jwt(now_i64() - 1, "stale"));

        let provider = ExternalTokenProvider::from_env().unwrap();
        clear_env();

        let err = TokenProvider::token(&provider).await.unwrap_err();
        assert!(err.is_expired(), "{:?}", err);

        // account ID stays unsupported whatever the expiry
        assert!(matches!(
            TokenProvider::account_id(&provider).await,
            Err(TokenError::Unsupported(_))
        ));
    }

    #[test]
    #[serial]
    fn missing_token_is_a_configuration_error() {
        clear_env();
        assert!(matches!(ExternalTokenProvider::from_env(), Err(TokenError::Configuration(_))));
    }

    #[test]
    fn undecodable_token_is_refused() {
        assert!(matches!(ExternalTokenProvider::new(Some("not-a-token")), Err(TokenError::Decode(_))));
    }
}
