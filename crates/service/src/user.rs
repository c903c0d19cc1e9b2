use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use inkwell_blob::{MediaKind, Uploader};
use inkwell_core::{
    AccountStatus, ChangePasswordRequest, RegisterUserRequest, Role, UpdateUserRequest, User,
    UserProfile,
};
use inkwell_query::{Filter, Patch, Sort, Value};
use inkwell_store::Repository;
use tracing::{info, instrument, warn};

use crate::actor::Actor;
use crate::error::ServiceError;
use crate::links::DEFAULT_LINK_TTL;
use crate::password::{hash_password, verify_password};
use crate::query::RawQuery;

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Account operations over a relational repository.
///
/// Every response is a [`UserProfile`]; password hashes stay inside the
/// service.
pub struct UserService {
    repo: Arc<dyn Repository<User>>,
    uploader: Arc<dyn Uploader>,
    link_ttl: Duration,
}

impl UserService {
    pub fn new(repo: Arc<dyn Repository<User>>, uploader: Arc<dyn Uploader>) -> Self {
        Self {
            repo,
            uploader,
            link_ttl: DEFAULT_LINK_TTL,
        }
    }

    /// Set the lifetime of presigned avatar links.
    #[must_use]
    pub fn with_link_ttl(mut self, ttl: Duration) -> Self {
        self.link_ttl = ttl;
        self
    }

    /// Create a `pending` account with the `basic` role. Returns its id.
    #[instrument(skip_all, fields(email = %request.email))]
    pub async fn register(&self, request: RegisterUserRequest) -> Result<String, ServiceError> {
        let email = request.email.trim().to_owned();
        if email.is_empty()
            || request.first_name.trim().is_empty()
            || request.last_name.trim().is_empty()
        {
            return Err(ServiceError::Validation(
                "email, first_name and last_name are required".into(),
            ));
        }
        if request.password.is_empty() {
            return Err(ServiceError::Validation("password is required".into()));
        }
        if self.find_by_email(&email).await?.is_some() {
            return Err(ServiceError::Validation("email is already registered".into()));
        }

        let now = Utc::now();
        let user = User {
            id: None,
            first_name: request.first_name,
            last_name: request.last_name,
            username: request.username,
            email,
            password: hash_password(&request.password)?,
            status: AccountStatus::Pending,
            role: Role::Basic,
            avatar: String::new(),
            avatar_folder: String::new(),
            wallet_balance: 0.0,
            created_at: now,
            updated_at: now,
        };

        let id = self.repo.insert(user).await?;
        info!(user_id = %id, "user registered");
        Ok(id)
    }

    /// Check an email/password pair. Fails for unknown emails, wrong
    /// passwords and accounts that may not sign in.
    #[instrument(skip_all, fields(email = %email))]
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, ServiceError> {
        let user = self
            .find_by_email(email.trim())
            .await?
            .ok_or_else(|| ServiceError::Unauthorized(INVALID_CREDENTIALS.into()))?;

        if !verify_password(&user.password, password) {
            warn!("password mismatch");
            return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.into()));
        }
        if !user.status.can_sign_in() {
            return Err(ServiceError::Unauthorized(format!(
                "account is {}",
                user.status
            )));
        }
        Ok(user.into())
    }

    /// Whether `user_id` still names an account that may act.
    pub async fn is_active(&self, user_id: &str) -> Result<bool, ServiceError> {
        Ok(self
            .repo
            .find_one(&[id_filter(user_id)])
            .await?
            .is_some_and(|u| u.status.can_sign_in()))
    }

    #[instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn get(&self, actor: &Actor, user_id: &str) -> Result<UserProfile, ServiceError> {
        authorize(actor, user_id)?;
        let user = self.load(user_id).await?;
        Ok(self.profile(user).await)
    }

    /// Raw list query over every account. Admins only.
    #[instrument(skip_all, fields(actor = %actor.id))]
    pub async fn find(
        &self,
        actor: &Actor,
        query: &RawQuery,
    ) -> Result<Vec<UserProfile>, ServiceError> {
        if !actor.is_admin() {
            return Err(ServiceError::Forbidden("admin role required".into()));
        }
        let options = query
            .parse(&User::field_types())?
            .with_default_sort(vec![Sort::desc("created_at")]);

        let users = self.repo.find(&options).await?;
        let mut profiles = Vec::with_capacity(users.len());
        for user in users {
            profiles.push(self.profile(user).await);
        }
        Ok(profiles)
    }

    #[instrument(skip_all, fields(actor = %actor.id, user_id = %user_id))]
    pub async fn change_password(
        &self,
        actor: &Actor,
        user_id: &str,
        request: ChangePasswordRequest,
    ) -> Result<(), ServiceError> {
        authorize(actor, user_id)?;
        if request.new_password.is_empty() {
            return Err(ServiceError::Validation("new_password is required".into()));
        }

        let user = self.load(user_id).await?;
        if !verify_password(&user.password, &request.old_password) {
            return Err(ServiceError::Unauthorized(
                "old password does not match".into(),
            ));
        }

        let patch = Patch::new()
            .set("password", hash_password(&request.new_password)?)
            .set("updated_at", Utc::now());
        self.apply(user_id, &patch).await?;
        info!("password changed");
        Ok(())
    }

    /// Update the given name fields; absent fields are left unchanged.
    #[instrument(skip_all, fields(actor = %actor.id, user_id = %user_id))]
    pub async fn update_profile(
        &self,
        actor: &Actor,
        user_id: &str,
        request: UpdateUserRequest,
    ) -> Result<UserProfile, ServiceError> {
        authorize(actor, user_id)?;

        let mut patch = Patch::new();
        for (field, value) in [
            ("first_name", request.first_name),
            ("last_name", request.last_name),
            ("username", request.username),
        ] {
            let Some(value) = value else { continue };
            if value.trim().is_empty() {
                return Err(ServiceError::Validation(format!("{field} cannot be empty")));
            }
            patch = patch.set(field, value);
        }
        if patch.is_empty() {
            return Err(ServiceError::Validation("nothing to update".into()));
        }

        self.apply(user_id, &patch.set("updated_at", Utc::now()))
            .await?;
        let user = self.load(user_id).await?;
        Ok(self.profile(user).await)
    }

    /// Upload a new avatar into the `avatars` folder and point the account
    /// at it.
    #[instrument(skip(self, actor, data), fields(actor = %actor.id, size = data.len()))]
    pub async fn update_avatar(
        &self,
        actor: &Actor,
        user_id: &str,
        filename: &str,
        data: Bytes,
    ) -> Result<UserProfile, ServiceError> {
        authorize(actor, user_id)?;
        self.load(user_id).await?;

        let kind = MediaKind::Avatar;
        let key = self
            .uploader
            .upload(
                kind.folder(),
                filename,
                kind.content_type(filename),
                user_id,
                data,
            )
            .await?;

        let patch = Patch::new()
            .set("avatar", key)
            .set("avatar_folder", kind.folder())
            .set("updated_at", Utc::now());
        self.apply(user_id, &patch).await?;
        info!("avatar updated");

        let user = self.load(user_id).await?;
        Ok(self.profile(user).await)
    }

    /// Mark the account as deleted. The row is kept.
    #[instrument(skip_all, fields(actor = %actor.id, user_id = %user_id))]
    pub async fn soft_delete(&self, actor: &Actor, user_id: &str) -> Result<(), ServiceError> {
        authorize(actor, user_id)?;
        let patch = Patch::new()
            .set("status", AccountStatus::Deleted.as_str())
            .set("updated_at", Utc::now());
        self.apply(user_id, &patch).await?;
        info!("user soft-deleted");
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        Ok(self.repo.find_one(&[Filter::eq("email", email)]).await?)
    }

    async fn load(&self, user_id: &str) -> Result<User, ServiceError> {
        self.repo
            .find_one(&[id_filter(user_id)])
            .await?
            .ok_or_else(|| ServiceError::NotFound("user not found".into()))
    }

    async fn apply(&self, user_id: &str, patch: &Patch) -> Result<(), ServiceError> {
        if self.repo.update_fields(&[id_filter(user_id)], patch).await? == 0 {
            return Err(ServiceError::NotFound("user not found".into()));
        }
        Ok(())
    }

    async fn profile(&self, user: User) -> UserProfile {
        let mut profile = UserProfile::from(user);
        if !profile.avatar.is_empty() {
            match self.uploader.presign(&profile.avatar, self.link_ttl).await {
                Ok(url) => profile.avatar_link = Some(url),
                Err(e) => warn!(key = %profile.avatar, error = %e, "avatar presign failed"),
            }
        }
        profile
    }
}

fn id_filter(user_id: &str) -> Filter {
    Filter::eq("id", Value::Identifier(user_id.to_owned()))
}

fn authorize(actor: &Actor, user_id: &str) -> Result<(), ServiceError> {
    if actor.can_manage(user_id) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(
            "not allowed to manage this account".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use inkwell_blob::MemoryUploader;
    use inkwell_store_memory::MemoryRepository;

    use super::*;

    fn service() -> (UserService, Arc<MemoryRepository<User>>) {
        let repo = Arc::new(MemoryRepository::<User>::new());
        let service = UserService::new(repo.clone(), Arc::new(MemoryUploader::new()));
        (service, repo)
    }

    fn ada() -> RegisterUserRequest {
        RegisterUserRequest {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            username: "ada".into(),
            email: "ada@example.com".into(),
            password: "analytical".into(),
        }
    }

    fn admin() -> Actor {
        Actor::new("0", Role::Admin)
    }

    async fn registered(service: &UserService) -> (String, Actor) {
        let id = service.register(ada()).await.unwrap();
        let actor = Actor::new(id.clone(), Role::Basic);
        (id, actor)
    }

    #[tokio::test]
    async fn register_hashes_and_defaults() {
        let (service, repo) = service();
        let id = service.register(ada()).await.unwrap();

        let stored = repo
            .find_one(&[id_filter(&id)])
            .await
            .unwrap()
            .unwrap();
        assert_ne!(stored.password, "analytical");
        assert!(verify_password(&stored.password, "analytical"));
        assert_eq!(stored.status, AccountStatus::Pending);
        assert_eq!(stored.role, Role::Basic);
    }

    #[tokio::test]
    async fn register_requires_names_and_unique_email() {
        let (service, _) = service();
        let mut missing = ada();
        missing.last_name = String::new();
        assert!(matches!(
            service.register(missing).await,
            Err(ServiceError::Validation(_))
        ));

        service.register(ada()).await.unwrap();
        assert!(matches!(
            service.register(ada()).await,
            Err(ServiceError::Validation(ref m)) if m.contains("already registered")
        ));
    }

    #[tokio::test]
    async fn authenticate_checks_password_and_status() {
        let (service, _) = service();
        let (id, actor) = registered(&service).await;

        let profile = service
            .authenticate("ada@example.com", "analytical")
            .await
            .unwrap();
        assert_eq!(profile.id, id);

        assert!(matches!(
            service.authenticate("ada@example.com", "wrong").await,
            Err(ServiceError::Unauthorized(ref m)) if m == INVALID_CREDENTIALS
        ));
        assert!(matches!(
            service.authenticate("nobody@example.com", "analytical").await,
            Err(ServiceError::Unauthorized(_))
        ));

        service.soft_delete(&actor, &id).await.unwrap();
        assert!(matches!(
            service.authenticate("ada@example.com", "analytical").await,
            Err(ServiceError::Unauthorized(ref m)) if m == "account is deleted"
        ));
        assert!(!service.is_active(&id).await.unwrap());
    }

    #[tokio::test]
    async fn change_password_verifies_old_one() {
        let (service, _) = service();
        let (id, actor) = registered(&service).await;

        let wrong = ChangePasswordRequest {
            old_password: "nope".into(),
            new_password: "engine".into(),
        };
        assert!(matches!(
            service.change_password(&actor, &id, wrong).await,
            Err(ServiceError::Unauthorized(_))
        ));

        let right = ChangePasswordRequest {
            old_password: "analytical".into(),
            new_password: "engine".into(),
        };
        service.change_password(&actor, &id, right).await.unwrap();
        service
            .authenticate("ada@example.com", "engine")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn accounts_are_private_to_owner_and_admins() {
        let (service, _) = service();
        let (id, _) = registered(&service).await;
        let other = Actor::new("someone-else", Role::Premium);

        assert!(matches!(
            service.get(&other, &id).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            service.soft_delete(&other, &id).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            service.find(&other, &RawQuery::new()).await,
            Err(ServiceError::Forbidden(_))
        ));

        assert_eq!(service.get(&admin(), &id).await.unwrap().email, "ada@example.com");
    }

    #[tokio::test]
    async fn update_profile_patches_given_fields() {
        let (service, _) = service();
        let (id, actor) = registered(&service).await;

        let profile = service
            .update_profile(
                &actor,
                &id,
                UpdateUserRequest {
                    first_name: Some("Augusta".into()),
                    ..UpdateUserRequest::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(profile.first_name, "Augusta");
        assert_eq!(profile.last_name, "Lovelace");

        assert!(matches!(
            service
                .update_profile(&actor, &id, UpdateUserRequest::default())
                .await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn avatar_is_uploaded_and_presigned() {
        let repo = Arc::new(MemoryRepository::<User>::new());
        let uploader = Arc::new(MemoryUploader::new());
        let service = UserService::new(repo, uploader.clone());
        let (id, actor) = registered(&service).await;

        let profile = service
            .update_avatar(&actor, &id, "me.jpg", Bytes::from_static(b"jpg"))
            .await
            .unwrap();

        let upload = &uploader.uploads()[0];
        assert_eq!(upload.folder, "avatars");
        assert_eq!(upload.content_type, "image/jpeg");
        assert_eq!(upload.owner_id, id);
        assert_eq!(profile.avatar, upload.key);
        assert_eq!(profile.avatar_folder, "avatars");
        assert!(profile.avatar_link.is_some());
    }

    #[tokio::test]
    async fn admin_find_filters_users() {
        let (service, _) = service();
        service.register(ada()).await.unwrap();
        let mut grace = ada();
        grace.first_name = "Grace".into();
        grace.email = "grace@example.com".into();
        service.register(grace).await.unwrap();

        let found = service
            .find(&admin(), &RawQuery::new().with_filter("first_name__==__Grace"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].email, "grace@example.com");

        let err = service
            .find(&admin(), &RawQuery::new().with_filter("wallet_balance__>__lots"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Parse(_)));
    }
}
