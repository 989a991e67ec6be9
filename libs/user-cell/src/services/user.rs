use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::supabase::{eq_filter, SupabaseClient};

use crate::models::{UserAccount, UserError, ADMIN_ROLE};

const USERS_PATH: &str = "/rest/v1/users";

pub struct UserService {
    supabase: SupabaseClient,
}

impl UserService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn list_users(&self) -> Result<Vec<UserAccount>, UserError> {
        let users: Vec<UserAccount> = self.supabase.request(Method::GET, USERS_PATH, None).await?;
        Ok(users)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, UserError> {
        let path = format!("{}?{}&limit=1", USERS_PATH, eq_filter("email", email));
        let users: Vec<UserAccount> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(users.into_iter().next())
    }

    /// Creates the account or merges `profile` into the existing one.
    /// Roles are never taken from the client.
    pub async fn upsert_user(
        &self,
        email: &str,
        mut profile: Map<String, Value>,
    ) -> Result<UserAccount, UserError> {
        debug!("Upserting user account for {}", email);

        profile.remove("role");
        profile.remove("id");
        profile.insert("email".to_string(), json!(email));

        let path = format!("{}?on_conflict=email", USERS_PATH);
        let headers = SupabaseClient::representation_headers(
            "return=representation,resolution=merge-duplicates",
        )?;

        let result: Vec<UserAccount> = self.supabase.request_with_headers(
            Method::POST,
            &path,
            Some(Value::Object(profile)),
            Some(headers),
        ).await?;

        result
            .into_iter()
            .next()
            .ok_or_else(|| UserError::Database("Upsert returned no account".to_string()))
    }

    pub async fn make_admin(&self, email: &str) -> Result<UserAccount, UserError> {
        let path = format!("{}?{}", USERS_PATH, eq_filter("email", email));
        let headers = SupabaseClient::representation_headers("return=representation")?;

        let result: Vec<UserAccount> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(json!({ "role": ADMIN_ROLE })),
            Some(headers),
        ).await?;

        let account = result
            .into_iter()
            .next()
            .ok_or_else(|| UserError::NotFound(email.to_string()))?;

        info!("Granted admin role to {}", email);
        Ok(account)
    }

    /// Unknown accounts are not admins.
    pub async fn is_admin(&self, email: &str) -> Result<bool, UserError> {
        Ok(self
            .find_by_email(email)
            .await?
            .map(|account| account.is_admin())
            .unwrap_or(false))
    }
}
