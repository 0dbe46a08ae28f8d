//! User Repository

use async_trait::async_trait;
use bson::oid::ObjectId;
use futures::TryStreamExt;
use mongodb::{Collection, Database, bson::doc};

use crate::shared::error::Result;
use crate::shared::memory::MemoryCollection;
use super::entity::{normalize_email, User, UserRole};

pub const USERS_COLLECTION: &str = "allUsers";

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert unless a user with the same email exists. Returns true when inserted.
    async fn insert_if_absent(&self, user: &User) -> Result<bool>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_all(&self) -> Result<Vec<User>>;

    /// Users holding `role`, newest first.
    async fn find_by_role(&self, role: UserRole) -> Result<Vec<User>>;

    /// Returns false when no user matched.
    async fn set_role(&self, id: &ObjectId, role: UserRole) -> Result<bool>;

    async fn update_profile(&self, id: &ObjectId, name: Option<String>, image: Option<String>) -> Result<bool>;

    async fn delete(&self, id: &ObjectId) -> Result<bool>;
}

pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(USERS_COLLECTION),
        }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn insert_if_absent(&self, user: &User) -> Result<bool> {
        // Single upsert so two first-logins for the same email cannot both insert.
        let document = bson::to_document(user)?;
        let result = self.collection
            .update_one(doc! { "email": &user.email }, doc! { "$setOnInsert": document })
            .upsert(true)
            .await?;
        Ok(result.upserted_id.is_some())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.collection.find_one(doc! { "email": normalize_email(email) }).await?)
    }

    async fn find_all(&self) -> Result<Vec<User>> {
        let cursor = self.collection.find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_role(&self, role: UserRole) -> Result<Vec<User>> {
        let cursor = self.collection
            .find(doc! { "role": role.as_str() })
            .sort(doc! { "date": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn set_role(&self, id: &ObjectId, role: UserRole) -> Result<bool> {
        let result = self.collection
            .update_one(doc! { "_id": id }, doc! { "$set": { "role": role.as_str() } })
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn update_profile(&self, id: &ObjectId, name: Option<String>, image: Option<String>) -> Result<bool> {
        let mut set = bson::Document::new();
        if let Some(name) = name {
            set.insert("name", name);
        }
        if let Some(image) = image {
            set.insert("image", image);
        }
        if set.is_empty() {
            return Ok(self.collection.count_documents(doc! { "_id": id }).await? > 0);
        }

        let result = self.collection
            .update_one(doc! { "_id": id }, doc! { "$set": set })
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: MemoryCollection<User>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert_if_absent(&self, user: &User) -> Result<bool> {
        let email = user.email.clone();
        Ok(self.users.insert_unless(user.clone(), |u| u.email == email))
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>> {
        Ok(self.users.find_by_id(id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = normalize_email(email);
        Ok(self.users.find_one(|u| u.email == email))
    }

    async fn find_all(&self) -> Result<Vec<User>> {
        Ok(self.users.find_all(|_| true))
    }

    async fn find_by_role(&self, role: UserRole) -> Result<Vec<User>> {
        let mut users = self.users.find_all(|u| u.role == role);
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn set_role(&self, id: &ObjectId, role: UserRole) -> Result<bool> {
        Ok(self.users.update_where(|u| u.id == *id, |u| u.role = role) > 0)
    }

    async fn update_profile(&self, id: &ObjectId, name: Option<String>, image: Option<String>) -> Result<bool> {
        let matched = self.users.update_where(
            |u| u.id == *id,
            |u| {
                if let Some(name) = &name {
                    u.name = Some(name.clone());
                }
                if let Some(image) = &image {
                    u.image = Some(image.clone());
                }
            },
        );
        Ok(matched > 0)
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool> {
        Ok(self.users.delete_where(|u| u.id == *id) > 0)
    }
}
