//! Federated Identity Linking
//!
//! Maps an external provider's userinfo onto a local principal:
//! reuse an existing link, merge into an account with the same email, or
//! create a fresh passwordless account.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::application::config::AuthConfig;
use crate::application::token_codec::TokenCodec;
use crate::application::token_lifecycle::TokenLifecycleManager;
use crate::domain::entity::{social_account::SocialAccount, token::TokenPair, user::User};
use crate::domain::repository::{RefreshTokenStore, SocialAccountRepository, UserRepository};
use crate::domain::value_object::{email::Email, nickname::Nickname, provider::Provider};
use crate::error::{AuthError, AuthResult};

/// Userinfo attributes returned by a provider, normalized per provider.
#[derive(Debug, Clone)]
pub struct OAuthAttributes {
    pub provider: Provider,
    /// Attribute holding the provider's unique account id (e.g. `sub`)
    pub name_attribute_key: String,
    pub attributes: Map<String, Value>,
    pub email: Option<String>,
    pub nickname: Option<String>,
}

impl OAuthAttributes {
    pub fn from_provider(
        registration_id: &str,
        name_attribute_key: &str,
        attributes: Map<String, Value>,
    ) -> AuthResult<Self> {
        match Provider::from_registration_id(registration_id)? {
            Provider::Google => Ok(Self::google(name_attribute_key, attributes)),
        }
    }

    fn google(name_attribute_key: &str, attributes: Map<String, Value>) -> Self {
        let text = |key: &str| attributes.get(key).and_then(Value::as_str).map(str::to_string);

        Self {
            provider: Provider::Google,
            name_attribute_key: name_attribute_key.to_string(),
            email: text("email"),
            nickname: text("given_name"),
            attributes,
        }
    }

    /// The provider's unique id for the account. Strings are taken verbatim,
    /// other JSON values by their JSON text.
    pub fn provider_id(&self) -> AuthResult<String> {
        let missing = || AuthError::MissingProviderId(self.name_attribute_key.clone());

        match self.attributes.get(&self.name_attribute_key) {
            None | Some(Value::Null) => Err(missing()),
            Some(Value::String(s)) if s.trim().is_empty() => Err(missing()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Ok(other.to_string()),
        }
    }
}

pub struct IdentityLinker<U, A>
where
    U: UserRepository,
    A: SocialAccountRepository,
{
    user_repo: Arc<U>,
    account_repo: Arc<A>,
}

impl<U, A> IdentityLinker<U, A>
where
    U: UserRepository,
    A: SocialAccountRepository,
{
    pub fn new(user_repo: Arc<U>, account_repo: Arc<A>) -> Self {
        Self {
            user_repo,
            account_repo,
        }
    }

    /// Resolve `(provider, provider_id)` to a principal, creating or linking
    /// as needed. The link lookup always runs first so a known provider id
    /// never produces a second principal.
    pub async fn link_or_create(
        &self,
        provider: Provider,
        provider_id: &str,
        email: &Email,
        display_name: Option<&str>,
    ) -> AuthResult<User> {
        if provider_id.trim().is_empty() {
            return Err(AuthError::MissingProviderId(provider.code().to_string()));
        }

        if let Some(user) = self
            .account_repo
            .find_linked_user(provider, provider_id)
            .await?
        {
            tracing::debug!(email = %user.email, provider = %provider, "Known federated identity");
            return Ok(user);
        }

        match self.user_repo.find_by_email(email).await? {
            Some(user) => self.link_existing(user, provider, provider_id).await,
            None => {
                let nickname = Nickname::from_provider(display_name, email.local_part());
                let user = User::new_federated(email.clone(), nickname);
                let account = SocialAccount::link(user.user_id, provider, provider_id);

                match self.account_repo.create_with_user(&user, &account).await {
                    Ok(()) => {
                        tracing::info!(email = %user.email, provider = %provider, "Created federated account");
                        Ok(user)
                    }
                    // A concurrent first login for the same identity got there first
                    Err(conflict @ (AuthError::EmailTaken | AuthError::ProviderAlreadyLinked)) => {
                        self.resolve_conflict(provider, provider_id, email, conflict)
                            .await
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }

    async fn link_existing(
        &self,
        user: User,
        provider: Provider,
        provider_id: &str,
    ) -> AuthResult<User> {
        if self.account_repo.exists_for_user(&user.user_id, provider).await? {
            return self.already_linked(&user, provider, provider_id).await;
        }

        let account = SocialAccount::link(user.user_id, provider, provider_id);
        match self.account_repo.create(&account).await {
            Ok(()) => {
                tracing::info!(email = %user.email, provider = %provider, "Linked provider to existing account");
                Ok(user)
            }
            Err(AuthError::ProviderAlreadyLinked) => {
                self.already_linked(&user, provider, provider_id).await
            }
            Err(e) => Err(e),
        }
    }

    /// The principal already has a link for `provider`. Accepted only when
    /// that link is `provider_id` itself.
    async fn already_linked(
        &self,
        user: &User,
        provider: Provider,
        provider_id: &str,
    ) -> AuthResult<User> {
        match self
            .account_repo
            .find_linked_user(provider, provider_id)
            .await?
        {
            Some(linked) if linked.user_id == user.user_id => Ok(linked),
            _ => {
                tracing::warn!(
                    email = %user.email,
                    provider = %provider,
                    "Principal already linked to a different provider account"
                );
                Err(AuthError::ProviderAlreadyLinked)
            }
        }
    }

    /// Re-run the lookups after losing an insert race. `conflict` is
    /// returned when neither finds a live principal, e.g. the email belongs
    /// to a deleted account.
    async fn resolve_conflict(
        &self,
        provider: Provider,
        provider_id: &str,
        email: &Email,
        conflict: AuthError,
    ) -> AuthResult<User> {
        if let Some(user) = self
            .account_repo
            .find_linked_user(provider, provider_id)
            .await?
        {
            tracing::debug!(email = %user.email, provider = %provider, "Federated identity created concurrently");
            return Ok(user);
        }

        match self.user_repo.find_by_email(email).await? {
            Some(user) => self.link_existing(user, provider, provider_id).await,
            None => Err(conflict),
        }
    }
}

/// Successful provider login: resolve the principal, then start a session.
pub struct FederatedSignInUseCase<U, A, S>
where
    U: UserRepository,
    A: SocialAccountRepository,
    S: RefreshTokenStore,
{
    linker: IdentityLinker<U, A>,
    lifecycle: TokenLifecycleManager<S, U>,
}

impl<U, A, S> FederatedSignInUseCase<U, A, S>
where
    U: UserRepository,
    A: SocialAccountRepository,
    S: RefreshTokenStore,
{
    pub fn new(
        user_repo: Arc<U>,
        account_repo: Arc<A>,
        store: Arc<S>,
        codec: Arc<TokenCodec>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            linker: IdentityLinker::new(user_repo.clone(), account_repo),
            lifecycle: TokenLifecycleManager::new(store, user_repo, codec, config),
        }
    }

    pub async fn execute(&self, attributes: &OAuthAttributes) -> AuthResult<(User, TokenPair)> {
        let provider_id = attributes.provider_id().inspect_err(|_| {
            tracing::error!(
                provider = %attributes.provider,
                key = %attributes.name_attribute_key,
                "Provider response has no unique id"
            );
        })?;

        let raw_email = attributes
            .email
            .as_deref()
            .ok_or_else(|| AuthError::InvalidInput("Provider response has no email".to_string()))?;
        let email = Email::new(raw_email)?;

        let user = self
            .linker
            .link_or_create(
                attributes.provider,
                &provider_id,
                &email,
                attributes.nickname.as_deref(),
            )
            .await?;

        let pair = self.lifecycle.issue(&user).await?;

        Ok((user, pair))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attributes(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_google_mapping() {
        let attrs = OAuthAttributes::from_provider(
            "google",
            "sub",
            attributes(json!({
                "sub": "12345",
                "given_name": "홍길동",
                "email": "test@example.com"
            })),
        )
        .unwrap();

        assert_eq!(attrs.provider, Provider::Google);
        assert_eq!(attrs.nickname.as_deref(), Some("홍길동"));
        assert_eq!(attrs.email.as_deref(), Some("test@example.com"));
        assert_eq!(attrs.name_attribute_key, "sub");
        assert_eq!(attrs.provider_id().unwrap(), "12345");
    }

    #[test]
    fn test_unsupported_provider() {
        let result = OAuthAttributes::from_provider("github", "id", Map::new());
        assert!(matches!(result, Err(AuthError::UnsupportedProvider(p)) if p == "github"));
    }

    #[test]
    fn test_numeric_provider_id() {
        let attrs =
            OAuthAttributes::from_provider("google", "id", attributes(json!({ "id": 123456789 })))
                .unwrap();
        assert_eq!(attrs.provider_id().unwrap(), "123456789");
    }

    #[test]
    fn test_missing_provider_id() {
        for body in [json!({ "email": "a@example.com" }), json!({ "id": null }), json!({ "id": "" })] {
            let attrs = OAuthAttributes::from_provider("google", "id", attributes(body)).unwrap();
            assert!(matches!(
                attrs.provider_id(),
                Err(AuthError::MissingProviderId(key)) if key == "id"
            ));
        }
    }
}
