//! Authors: the `Author` type, lookups, registration, profile updates and
//! sign-in.

use async_graphql::{Context, InputObject, Object, Result, ResultExt, ID};
use inkwell_core::error::CoreError;
use inkwell_core::types::DbId;
use inkwell_core::validation::{
    normalize_username, require_non_blank, require_non_blank_if_present,
};
use inkwell_db::models::author as model;
use inkwell_db::repositories::AuthorRepo;

use super::blog_post::BlogPost;
use super::context::{identity, jwt, loaders, pool};
use crate::auth::cookies::session_cookies;
use crate::auth::jwt::{generate_token, TokenAuthor};
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};

pub struct Author(pub model::Author);

#[Object(rename_fields = "snake_case")]
impl Author {
    pub(crate) async fn id(&self) -> ID {
        ID::from(self.0.id)
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn username(&self) -> &str {
        &self.0.username
    }

    /// Every post by this author, newest first.
    async fn blog_posts(&self, ctx: &Context<'_>) -> Result<Vec<BlogPost>> {
        posts_of(ctx, self.0.id).await.extend()
    }
}

async fn posts_of(ctx: &Context<'_>, author_id: DbId) -> AppResult<Vec<BlogPost>> {
    let posts = loaders(ctx)?
        .blog_posts_by_author
        .load(author_id)
        .await?
        .unwrap_or_default();
    Ok(posts.into_iter().map(BlogPost).collect())
}

/// Resolve an author through the request's loader.
pub(super) async fn load_author(ctx: &Context<'_>, id: DbId) -> AppResult<Option<Author>> {
    Ok(loaders(ctx)?.authors.load(id).await?.map(Author))
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct AuthorQuery;

#[Object]
impl AuthorQuery {
    /// The earliest-registered author with this display name.
    async fn author(&self, ctx: &Context<'_>, name: String) -> Result<Option<Author>> {
        find_by_name(ctx, &name).await.extend()
    }

    /// Every author, in registration order.
    async fn authors(&self, ctx: &Context<'_>) -> Result<Vec<Author>> {
        list(ctx).await.extend()
    }
}

async fn find_by_name(ctx: &Context<'_>, name: &str) -> AppResult<Option<Author>> {
    let author = AuthorRepo::find_by_name(pool(ctx)?, name).await?;
    if let Some(author) = &author {
        loaders(ctx)?.authors.prime(author.id, author.clone());
    }
    Ok(author.map(Author))
}

async fn list(ctx: &Context<'_>) -> AppResult<Vec<Author>> {
    let authors = AuthorRepo::list(pool(ctx)?).await?;
    let loaders = loaders(ctx)?;
    for author in &authors {
        loaders.authors.prime(author.id, author.clone());
    }
    Ok(authors.into_iter().map(Author).collect())
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

#[derive(Debug, InputObject)]
pub struct CreateAuthorInput {
    pub name: String,
    pub username: String,
    pub password: String,
}

/// Profile changes. `password` is the current password and is always
/// required.
#[derive(Debug, InputObject)]
#[graphql(rename_fields = "snake_case")]
pub struct UpdateAuthorInput {
    pub name: Option<String>,
    pub username: Option<String>,
    pub password: String,
    pub new_password: Option<String>,
}

#[derive(Default)]
pub struct AuthorMutation;

#[Object]
impl AuthorMutation {
    /// Register a new author.
    async fn create_author(&self, ctx: &Context<'_>, input: CreateAuthorInput) -> Result<Author> {
        create(ctx, input).await.extend()
    }

    /// Change the logged-in author's profile. Returns a fresh token and
    /// resets the session cookies.
    async fn update_author(&self, ctx: &Context<'_>, input: UpdateAuthorInput) -> Result<String> {
        update(ctx, input).await.extend()
    }

    /// Sign in. Returns the token and sets the session cookies.
    async fn authenticate(
        &self,
        ctx: &Context<'_>,
        username: String,
        password: String,
    ) -> Result<String> {
        authenticate(ctx, &username, &password).await.extend()
    }
}

fn hash(password: &str) -> AppResult<String> {
    hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))
}

fn verify(password: &str, hash: &str) -> AppResult<bool> {
    verify_password(password, hash)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {e}")))
}

async fn ensure_username_free(ctx: &Context<'_>, username: &str) -> AppResult<()> {
    if AuthorRepo::find_by_username(pool(ctx)?, username)
        .await?
        .is_some()
    {
        return Err(CoreError::Conflict(format!(
            "Username '{}' is already taken",
            normalize_username(username)
        ))
        .into());
    }
    Ok(())
}

async fn create(ctx: &Context<'_>, input: CreateAuthorInput) -> AppResult<Author> {
    require_non_blank("name", &input.name)?;
    require_non_blank("username", &input.username)?;
    require_non_blank("password", &input.password)?;
    ensure_username_free(ctx, &input.username).await?;

    let author = AuthorRepo::create(
        pool(ctx)?,
        &model::CreateAuthor {
            name: input.name.trim().to_string(),
            username: input.username,
            password_hash: hash(&input.password)?,
        },
    )
    .await?;

    tracing::info!(author_id = %author.id, username = %author.username, "Author registered");
    loaders(ctx)?.authors.prime(author.id, author.clone());
    Ok(Author(author))
}

async fn update(ctx: &Context<'_>, input: UpdateAuthorInput) -> AppResult<String> {
    let author_id = identity(ctx)?.require()?.id;
    require_non_blank_if_present("name", input.name.as_deref())?;
    require_non_blank_if_present("username", input.username.as_deref())?;
    require_non_blank_if_present("new_password", input.new_password.as_deref())?;

    let pool = pool(ctx)?;
    let current = AuthorRepo::find_by_id(pool, author_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Author",
            id: author_id,
        })?;

    if !verify(&input.password, &current.password_hash)? {
        return Err(CoreError::Unauthorized("Incorrect password".into()).into());
    }

    if let Some(username) = &input.username {
        if normalize_username(username) != current.username {
            ensure_username_free(ctx, username).await?;
        }
    }

    let password_hash = input.new_password.as_deref().map(hash).transpose()?;
    let updated = AuthorRepo::update(
        pool,
        author_id,
        &model::UpdateAuthor {
            name: input.name.map(|n| n.trim().to_string()),
            username: input.username,
            password_hash,
        },
    )
    .await?
    .ok_or(CoreError::NotFound {
        entity: "Author",
        id: author_id,
    })?;

    let loaders = loaders(ctx)?;
    loaders.authors.clear(&updated.id);
    loaders.authors.prime(updated.id, updated.clone());

    tracing::info!(author_id = %updated.id, "Author profile updated");
    start_session(ctx, &updated)
}

async fn authenticate(ctx: &Context<'_>, username: &str, password: &str) -> AppResult<String> {
    let invalid = || AppError::Core(CoreError::Unauthorized("Invalid username or password".into()));

    let author = AuthorRepo::find_by_username(pool(ctx)?, username)
        .await?
        .ok_or_else(invalid)?;
    if !verify(password, &author.password_hash)? {
        return Err(invalid());
    }

    tracing::info!(author_id = %author.id, "Author signed in");
    start_session(ctx, &author)
}

/// Issue a token for `author` and attach the split session cookies to the
/// response.
fn start_session(ctx: &Context<'_>, author: &model::Author) -> AppResult<String> {
    let config = jwt(ctx)?;
    let token = generate_token(&TokenAuthor::from(author), config)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    for cookie in session_cookies(&token, config)? {
        ctx.append_http_header("set-cookie", cookie);
    }
    Ok(token)
}
