//! Post repository over a [`DocumentStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use folio_core::ports::PostRepository;
use folio_core::{NewPost, PaginationInfo, Post, PostPage, PostUpdate, RepoError};

use super::store::{DocumentError, DocumentStore};

const DEFAULT_COLLECTION: &str = "posts";

/// Stored shape of a post. The id is the document key, not a field.
#[derive(Debug, Serialize, Deserialize)]
struct PostDocument {
    title: String,
    description: String,
    body: String,
    author: String,
    created: DateTime<Utc>,
    edited: DateTime<Utc>,
}

impl PostDocument {
    fn into_post(self, id: i32) -> Post {
        Post {
            id,
            title: self.title,
            description: self.description,
            body: self.body,
            author: self.author,
            created: self.created,
            edited: self.edited,
        }
    }
}

impl From<Post> for PostDocument {
    fn from(post: Post) -> Self {
        Self {
            title: post.title,
            description: post.description,
            body: post.body,
            author: post.author,
            created: post.created,
            edited: post.edited,
        }
    }
}

fn decode(id: i32, doc: Value) -> Result<Post, DocumentError> {
    let doc: PostDocument = serde_json::from_value(doc)?;
    Ok(doc.into_post(id))
}

fn encode(post: Post) -> Result<Value, DocumentError> {
    Ok(serde_json::to_value(PostDocument::from(post))?)
}

/// Posts backend for document stores.
///
/// Ordering and paging happen client side, so listing and paging cost
/// O(total posts). New ids are `max + 1` over the existing keys; two
/// concurrent creates can pick the same id; the loser fails instead of
/// overwriting the winner.
///
/// Documents whose key is not an integer are invisible to listing and
/// paging, but [`PostRepository::count_posts`] reports the store's native
/// count and still includes them. Only this repository should write to
/// its collection if the two numbers must agree.
pub struct DocumentPostRepository<S> {
    store: S,
    collection: String,
}

impl<S: DocumentStore> DocumentPostRepository<S> {
    pub fn new(store: S) -> Self {
        Self::with_collection(store, DEFAULT_COLLECTION)
    }

    pub fn with_collection(store: S, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    async fn fetch(&self, operation: &'static str, id: i32) -> Result<Post, RepoError> {
        let doc = self
            .store
            .get(&self.collection, &id.to_string())
            .await
            .map_err(|e| RepoError::backend_for(operation, id, e))?
            .ok_or(RepoError::NotFound(id))?;

        decode(id, doc).map_err(|e| RepoError::backend_for(operation, id, e))
    }

    async fn scan(&self, operation: &'static str) -> Result<Vec<Post>, RepoError> {
        let docs = self
            .store
            .list(&self.collection)
            .await
            .map_err(|e| RepoError::backend(operation, e))?;

        let mut posts = Vec::with_capacity(docs.len());
        for (key, doc) in docs {
            let Ok(id) = key.parse::<i32>() else {
                tracing::warn!(collection = %self.collection, key = %key, "Skipping document with non-numeric id");
                continue;
            };
            posts.push(decode(id, doc).map_err(|e| RepoError::backend_for(operation, id, e))?);
        }

        posts.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));
        Ok(posts)
    }

    async fn next_id(&self) -> Result<i32, RepoError> {
        let ids = self
            .store
            .list_ids(&self.collection)
            .await
            .map_err(|e| RepoError::backend("getting next post id", e))?;

        let max = ids
            .iter()
            .filter_map(|key| key.parse::<i32>().ok())
            .max()
            .unwrap_or(0);

        max.checked_add(1)
            .ok_or_else(|| RepoError::backend("getting next post id", "post id space exhausted"))
    }
}

#[async_trait]
impl<S: DocumentStore> PostRepository for DocumentPostRepository<S> {
    async fn get_post(&self, id: i32) -> Result<Post, RepoError> {
        tracing::debug!(post_id = id, "Fetching post document");
        self.fetch("getting post", id).await
    }

    async fn list_posts(&self) -> Result<Vec<Post>, RepoError> {
        self.scan("getting posts").await
    }

    async fn list_posts_paginated(&self, page: i64) -> Result<PostPage, RepoError> {
        let mut posts = self.scan("getting posts for pagination").await?;
        let pagination = PaginationInfo::new(posts.len() as u64, page);

        let window = pagination.window(posts.len());
        posts.truncate(window.end);
        posts.drain(..window.start);

        tracing::debug!(
            requested_page = page,
            current_page = pagination.current_page,
            total_posts = pagination.total_posts,
            "Fetched posts page"
        );

        Ok(PostPage { posts, pagination })
    }

    async fn count_posts(&self) -> Result<u64, RepoError> {
        self.store
            .count(&self.collection)
            .await
            .map_err(|e| RepoError::backend("getting posts count", e))
    }

    async fn create_post(&self, new_post: NewPost) -> Result<Post, RepoError> {
        let id = self.next_id().await?;
        let post = new_post.into_post(id, Utc::now());
        let doc = encode(post.clone()).map_err(|e| RepoError::backend("creating post", e))?;

        self.store
            .create(&self.collection, &id.to_string(), doc)
            .await
            .map_err(|e| RepoError::backend_for("creating post", id, e))?;

        tracing::info!(post_id = id, "Post created");
        Ok(post)
    }

    async fn update_post(&self, id: i32, update: PostUpdate) -> Result<(), RepoError> {
        let mut post = self.fetch("updating post", id).await?;
        update.apply(&mut post, Utc::now());

        let doc = encode(post).map_err(|e| RepoError::backend_for("updating post", id, e))?;
        self.store
            .replace(&self.collection, &id.to_string(), doc)
            .await
            .map_err(|e| RepoError::backend_for("updating post", id, e))?;

        tracing::info!(post_id = id, "Post updated");
        Ok(())
    }

    async fn delete_post(&self, id: i32) -> Result<(), RepoError> {
        // Existence is checked first so a missing post is reported as such
        // even by stores whose delete is silent.
        self.fetch("deleting post", id).await?;

        let existed = self
            .store
            .delete(&self.collection, &id.to_string())
            .await
            .map_err(|e| RepoError::backend_for("deleting post", id, e))?;

        if !existed {
            return Err(RepoError::NotFound(id));
        }

        tracing::info!(post_id = id, "Post deleted");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        self.store.store_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docstore::InMemoryDocumentStore;
    use chrono::TimeDelta;
    use serde_json::json;

    fn repo() -> DocumentPostRepository<InMemoryDocumentStore> {
        DocumentPostRepository::new(InMemoryDocumentStore::new())
    }

    async fn seed(repo: &DocumentPostRepository<InMemoryDocumentStore>, n: i32) {
        let base = Utc::now() - TimeDelta::days(1);
        for id in 1..=n {
            let post = NewPost::new(format!("Post {id}"), "", format!("post-{id}.html"), "Admin")
                .into_post(id, base + TimeDelta::minutes(id as i64));
            repo.store
                .create("posts", &id.to_string(), encode(post).unwrap())
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let repo = repo();

        let first = repo
            .create_post(NewPost::new("First", "One", "first.html", "Admin"))
            .await
            .unwrap();
        let second = repo
            .create_post(NewPost::new("Second", "Two", "second.html", "Admin"))
            .await
            .unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.created, first.edited);

        let stored = repo.get_post(2).await.unwrap();
        assert_eq!(stored, second);
    }

    #[tokio::test]
    async fn test_next_id_follows_max_not_count() {
        let repo = repo();
        seed(&repo, 3).await;
        repo.delete_post(2).await.unwrap();

        let post = repo
            .create_post(NewPost::new("Fourth", "", "fourth.html", "Admin"))
            .await
            .unwrap();
        assert_eq!(post.id, 4);
    }

    /// Store whose id listing is always stale, as seen by a writer that
    /// lost the race for the next id.
    struct StaleIds(InMemoryDocumentStore);

    #[async_trait]
    impl DocumentStore for StaleIds {
        async fn get(&self, c: &str, id: &str) -> Result<Option<Value>, DocumentError> {
            self.0.get(c, id).await
        }
        async fn list(&self, c: &str) -> Result<Vec<(String, Value)>, DocumentError> {
            self.0.list(c).await
        }
        async fn list_ids(&self, _c: &str) -> Result<Vec<String>, DocumentError> {
            Ok(Vec::new())
        }
        async fn count(&self, c: &str) -> Result<u64, DocumentError> {
            self.0.count(c).await
        }
        async fn create(&self, c: &str, id: &str, doc: Value) -> Result<(), DocumentError> {
            self.0.create(c, id, doc).await
        }
        async fn replace(&self, c: &str, id: &str, doc: Value) -> Result<(), DocumentError> {
            self.0.replace(c, id, doc).await
        }
        async fn delete(&self, c: &str, id: &str) -> Result<bool, DocumentError> {
            self.0.delete(c, id).await
        }
        fn store_name(&self) -> &'static str {
            "stale"
        }
    }

    #[tokio::test]
    async fn test_lost_id_race_fails_without_overwriting() {
        let repo = DocumentPostRepository::new(StaleIds(InMemoryDocumentStore::new()));
        repo.create_post(NewPost::new("Winner", "", "winner.html", "Admin"))
            .await
            .unwrap();

        let err = repo
            .create_post(NewPost::new("Loser", "", "loser.html", "Admin"))
            .await
            .unwrap_err();

        assert!(!err.is_not_found());
        assert!(err.to_string().contains("already exists"));
        assert_eq!(repo.get_post(1).await.unwrap().title, "Winner");
    }

    async fn seed_raw(repo: &DocumentPostRepository<InMemoryDocumentStore>, id: &str) {
        let post = NewPost::new("Raw", "", "raw.html", "Admin").into_post(0, Utc::now());
        repo.store
            .create("posts", id, encode(post).unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_posts_newest_first() {
        let repo = repo();
        seed(&repo, 3).await;

        let posts = repo.list_posts().await.unwrap();
        let ids: Vec<i32> = posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_list_skips_non_numeric_keys() {
        let repo = repo();
        seed(&repo, 2).await;
        seed_raw(&repo, "about").await;

        let posts = repo.list_posts().await.unwrap();
        assert_eq!(posts.len(), 2);

        let next = repo
            .create_post(NewPost::new("Next", "", "next.html", "Admin"))
            .await
            .unwrap();
        assert_eq!(next.id, 3);
    }

    #[tokio::test]
    async fn test_count_is_native_and_includes_foreign_keys() {
        let repo = repo();
        seed(&repo, 1).await;
        seed_raw(&repo, "about").await;

        assert_eq!(repo.count_posts().await.unwrap(), 2);
        let page = repo.list_posts_paginated(1).await.unwrap();
        assert_eq!(page.pagination.total_posts, 1);
    }

    #[tokio::test]
    async fn test_create_fails_when_id_space_is_exhausted() {
        let repo = repo();
        seed_raw(&repo, &i32::MAX.to_string()).await;

        let err = repo
            .create_post(NewPost::new("Overflow", "", "overflow.html", "Admin"))
            .await
            .unwrap_err();

        assert!(!err.is_not_found());
        assert!(err.to_string().contains("post id space exhausted"));
        assert_eq!(repo.count_posts().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_malformed_document_is_backend_error() {
        let repo = repo();
        repo.store
            .create("posts", "1", json!({"title": 42}))
            .await
            .unwrap();

        let err = repo.get_post(1).await.unwrap_err();
        assert!(!err.is_not_found());
        assert!(err.to_string().starts_with("error getting post (post 1)"));
    }

    #[tokio::test]
    async fn test_paginated_slices_client_side() {
        let repo = repo();
        seed(&repo, 12).await;

        let page = repo.list_posts_paginated(1).await.unwrap();
        let ids: Vec<i32> = page.posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![12, 11, 10, 9, 8]);
        assert_eq!(page.pagination.total_pages, 3);
        assert!(page.pagination.has_next);

        let last = repo.list_posts_paginated(3).await.unwrap();
        let ids: Vec<i32> = last.posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert!(!last.pagination.has_next);
        assert_eq!(last.pagination.prev_page, 2);
    }

    #[tokio::test]
    async fn test_paginated_clamps_out_of_range_pages() {
        let repo = repo();
        seed(&repo, 7).await;

        let past_end = repo.list_posts_paginated(40).await.unwrap();
        assert_eq!(past_end.pagination.current_page, 2);
        assert_eq!(past_end.posts.len(), 2);

        let negative = repo.list_posts_paginated(-3).await.unwrap();
        assert_eq!(negative.pagination.current_page, 1);
        assert_eq!(negative.posts.len(), 5);
    }

    #[tokio::test]
    async fn test_paginated_empty_collection() {
        let repo = repo();

        let page = repo.list_posts_paginated(1).await.unwrap();
        assert!(page.posts.is_empty());
        assert_eq!(page.pagination.current_page, 1);
        assert_eq!(page.pagination.total_pages, 0);
        assert_eq!(page.pagination.total_posts, 0);
    }

    #[tokio::test]
    async fn test_count_posts() {
        let repo = repo();
        assert_eq!(repo.count_posts().await.unwrap(), 0);

        seed(&repo, 4).await;
        assert_eq!(repo.count_posts().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_update_keeps_created_and_empty_body() {
        let repo = repo();
        seed(&repo, 1).await;
        let before = repo.get_post(1).await.unwrap();

        repo.update_post(1, PostUpdate::new("Renamed", "New excerpt", ""))
            .await
            .unwrap();

        let after = repo.get_post(1).await.unwrap();
        assert_eq!(after.title, "Renamed");
        assert_eq!(after.description, "New excerpt");
        assert_eq!(after.body, before.body);
        assert_eq!(after.created, before.created);
        assert!(after.edited > before.edited);

        repo.update_post(1, PostUpdate::new("Renamed", "", "renamed.html"))
            .await
            .unwrap();
        assert_eq!(repo.get_post(1).await.unwrap().body, "renamed.html");
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_post() {
        let repo = repo();

        let err = repo
            .update_post(9, PostUpdate::new("T", "", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(9)));

        let err = repo.delete_post(9).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(9)));
        assert_eq!(repo.count_posts().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_post() {
        let repo = repo();
        seed(&repo, 2).await;

        repo.delete_post(1).await.unwrap();
        assert!(repo.get_post(1).await.unwrap_err().is_not_found());
        assert_eq!(repo.count_posts().await.unwrap(), 1);
    }

    #[test]
    fn test_backend_name_comes_from_store() {
        assert_eq!(repo().backend_name(), "memory");
    }
}
