use std::path::PathBuf;

use crate::config::ConfigOverrides;
use crate::entities::{CategoryId, FileId, PostId, PostStatus, Provider, UserId};
use crate::repositories::{Filter, Gravity, ImageFormat};

pub mod parser;

use parser::*;

/// blog client for an appwrite-compatible backend.
/// without a subcommand, starts an interactive shell.
#[derive(Debug, Clone, ::clap::Parser)]
#[clap(author, version)]
pub struct App {
    #[clap(flatten)]
    pub backend: BackendArgs,

    #[clap(subcommand)]
    pub cmd: Option<RootMod>,
}

/// one line typed into the shell.
#[derive(Debug, Clone, ::clap::Parser)]
#[clap(no_binary_name = true, disable_version_flag = true)]
pub struct Line {
    #[clap(subcommand)]
    pub cmd: LineMod,
}

#[derive(Debug, Clone, ::clap::Subcommand)]
pub enum LineMod {
    #[clap(flatten)]
    Root(RootMod),

    /// act as the oauth provider's redirect: open a session for this identity (--offline only).
    OauthAccept {
        email: String,
        #[clap(long)]
        name: String,
    },

    /// leave the shell.
    #[clap(alias = "quit")]
    Exit,
}

#[derive(Debug, Clone, ::clap::Args)]
pub struct BackendArgs {
    /// api endpoint, e.g. `https://cloud.appwrite.io/v1`
    #[clap(long, global = true)]
    pub endpoint: Option<String>,

    #[clap(long = "project", global = true)]
    pub project_id: Option<String>,

    #[clap(long = "database", global = true)]
    pub database_id: Option<String>,

    #[clap(long = "bucket", global = true)]
    pub bucket_id: Option<String>,

    /// base of links sent by mail
    #[clap(long = "frontend", global = true)]
    pub frontend_url: Option<String>,

    /// keep everything in memory; nothing is sent anywhere.
    #[clap(long, global = true)]
    pub offline: bool,
}

impl BackendArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            endpoint: self.endpoint.clone(),
            project_id: self.project_id.clone(),
            database_id: self.database_id.clone(),
            bucket_id: self.bucket_id.clone(),
            frontend_url: self.frontend_url.clone(),
        }
    }
}

#[derive(Debug, Clone, ::clap::Subcommand)]
pub enum RootMod {
    /// about account and session.
    #[clap(short_flag = 'A')]
    Account {
        #[clap(subcommand)]
        cmd: AccountMod,
    },

    /// about posts.
    #[clap(short_flag = 'P')]
    Post {
        #[clap(subcommand)]
        cmd: PostMod,
    },

    /// about executed user's bookmarks.
    #[clap(short_flag = 'B')]
    Bookmark {
        #[clap(subcommand)]
        cmd: BookmarkMod,
    },

    /// about profiles.
    #[clap(short_flag = 'U')]
    Profile {
        #[clap(subcommand)]
        cmd: ProfileMod,
    },

    /// about uploaded images.
    #[clap(short_flag = 'M')]
    Media {
        #[clap(subcommand)]
        cmd: MediaMod,
    },

    /// list categories.
    Categories,

    /// show what opening a frontend path would do right now.
    Open {
        /// str, e.g. `/edit-post/abc` or `/search?q=rust`
        #[clap(name = "PATH")]
        path: String,
    },
}

#[derive(Debug, Clone, ::clap::Subcommand)]
pub enum AccountMod {
    /// create account, sign in and send a verification mail.
    SignUp {
        #[clap(long)]
        name: String,
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
    },

    SignIn {
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
    },

    SignOut,

    /// resolve the current session.
    Check,

    /// about email verification.
    Verify {
        #[clap(subcommand)]
        op: VerifyOp,
    },

    /// send a password recovery mail.
    Recover {
        #[clap(long)]
        email: String,
    },

    /// set a new password with the secret from a recovery mail.
    Reset {
        #[clap(long)]
        user_id: Option<UserId>,
        #[clap(long)]
        secret: Option<String>,
        #[clap(long)]
        password: String,
        #[clap(long)]
        confirm: String,
    },

    ChangePassword {
        #[clap(long)]
        old: String,
        #[clap(long)]
        new: String,
    },

    /// change display name.
    Rename {
        #[clap(name = "NAME")]
        name: String,
    },

    /// block executed user's account and sign out.
    Deactivate,

    /// print the url to start an oauth sign in.
    OauthUrl {
        /// google | facebook | github | ...
        #[clap(name = "PROVIDER", default_value = "google")]
        provider: Provider,
    },

    /// finish an oauth sign in, as the callback page does.
    OauthCallback {
        #[clap(name = "PROVIDER", default_value = "google")]
        provider: Provider,
    },
}

#[derive(Debug, Clone, ::clap::Subcommand)]
pub enum VerifyOp {
    /// send the verification mail again.
    Request,

    /// complete with the values from the verification link.
    Complete {
        #[clap(long)]
        user_id: Option<UserId>,
        #[clap(long)]
        secret: Option<String>,
    },
}

#[derive(Debug, Clone, ::clap::Subcommand)]
pub enum PostMod {
    #[clap(short_flag = 'g')]
    Get {
        #[clap(name = "POST_ID")]
        post_id: PostId,
    },

    /// post as executed user.
    #[clap(short_flag = 'c')]
    Create(PostCreateCmd),

    #[clap(short_flag = 'e')]
    Edit(PostEditCmd),

    #[clap(short_flag = 'd')]
    Delete {
        #[clap(name = "POST_ID")]
        post_id: PostId,
    },

    /// list active posts, newest first.
    #[clap(short_flag = 'q')]
    List {
        /// u32 (1 =< n)
        #[clap(name = "PAGE", default_value = "1", parse(try_from_str = parse_nonzero_num))]
        page: u32,

        /// json query, passed to the backend as-is
        ///
        /// schema: {
        ///   method: "equal" | "notEqual" | "contains" | "search" | "and" | "or",
        ///   attribute?: str,
        ///   values: [any] | [query],
        /// }
        ///
        /// # example
        ///
        /// {"method":"equal","attribute":"category","values":["rust"]}
        #[clap(long, parse(try_from_str = parse_filter))]
        query: Option<Filter>,

        /// include inactive posts.
        #[clap(long)]
        all: bool,

        #[clap(long)]
        oldest_first: bool,
    },

    /// posts of a user, any status.
    ByUser {
        #[clap(name = "USER_ID")]
        user_id: UserId,

        #[clap(name = "PAGE", default_value = "1", parse(try_from_str = parse_nonzero_num))]
        page: u32,
    },

    Search {
        #[clap(name = "TERM")]
        term: String,

        #[clap(name = "PAGE", default_value = "1", parse(try_from_str = parse_nonzero_num))]
        page: u32,
    },

    Category {
        #[clap(name = "CATEGORY_ID")]
        category_id: CategoryId,

        #[clap(name = "PAGE", default_value = "1", parse(try_from_str = parse_nonzero_num))]
        page: u32,
    },
}

#[derive(Debug, Clone, ::clap::Args)]
pub struct PostCreateCmd {
    #[clap(long)]
    pub title: String,

    /// html
    #[clap(long)]
    pub content: String,

    /// derived from the title if not given.
    #[clap(long)]
    pub slug: Option<String>,

    #[clap(long)]
    pub category: Option<CategoryId>,

    /// active | inactive
    #[clap(long, default_value = "active")]
    pub status: PostStatus,

    /// featured image file.
    #[clap(long)]
    pub image: Option<PathBuf>,
}

#[derive(Debug, Clone, ::clap::Args)]
pub struct PostEditCmd {
    #[clap(name = "POST_ID")]
    pub post_id: PostId,

    #[clap(long)]
    pub title: Option<String>,

    #[clap(long)]
    pub content: Option<String>,

    #[clap(long)]
    pub slug: Option<String>,

    #[clap(long, conflicts_with = "no_category")]
    pub category: Option<CategoryId>,

    #[clap(long)]
    pub no_category: bool,

    #[clap(long)]
    pub status: Option<PostStatus>,

    /// replaces the featured image.
    #[clap(long, conflicts_with = "remove_image")]
    pub image: Option<PathBuf>,

    #[clap(long)]
    pub remove_image: bool,
}

#[derive(Debug, Clone, ::clap::Subcommand)]
pub enum BookmarkMod {
    /// is the post bookmarked by executed user?
    #[clap(short_flag = 's')]
    Status {
        #[clap(name = "POST_ID")]
        post_id: PostId,
    },

    /// bookmark, or unbookmark if already bookmarked.
    #[clap(short_flag = 't')]
    Toggle {
        #[clap(name = "POST_ID")]
        post_id: PostId,
    },

    /// list bookmark records.
    /// if not given user id, fallback to executed user's id.
    #[clap(short_flag = 'q')]
    List {
        #[clap(name = "PAGE", default_value = "1", parse(try_from_str = parse_nonzero_num))]
        page: u32,

        #[clap(long)]
        user_id: Option<UserId>,
    },

    /// the bookmarked posts themselves.
    Posts {
        #[clap(name = "PAGE", default_value = "1", parse(try_from_str = parse_nonzero_num))]
        page: u32,
    },
}

#[derive(Debug, Clone, ::clap::Subcommand)]
pub enum ProfileMod {
    /// get profile with id.
    /// if not given id, fallback to executed user's id.
    #[clap(short_flag = 'g')]
    Get {
        #[clap(name = "USER_ID")]
        user_id: Option<UserId>,
    },

    /// profile, active posts and counts.
    Author {
        #[clap(name = "USER_ID")]
        user_id: UserId,

        #[clap(name = "PAGE", default_value = "1", parse(try_from_str = parse_nonzero_num))]
        page: u32,
    },
}

#[derive(Debug, Clone, ::clap::Subcommand)]
pub enum MediaMod {
    Upload {
        #[clap(name = "FILE")]
        path: PathBuf,
    },

    Preview {
        #[clap(name = "FILE_ID")]
        file_id: FileId,

        #[clap(long)]
        width: Option<u32>,

        #[clap(long)]
        height: Option<u32>,

        /// center | top-left | top | ... | bottom-right
        #[clap(long, parse(try_from_str = parse_gravity))]
        gravity: Option<Gravity>,

        /// 0..=100
        #[clap(long)]
        quality: Option<u8>,

        /// jpg | png | webp | gif
        #[clap(long, parse(try_from_str = parse_image_format))]
        output: Option<ImageFormat>,
    },

    Delete {
        #[clap(name = "FILE_ID")]
        file_id: FileId,
    },
}
