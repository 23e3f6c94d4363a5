//! Account commands: register, login, logout, whoami, profile.

use clap::Subcommand;

use crate::{
    auth::{Authenticator, LocalAuth},
    model::{ProfileUpdate, User},
    storage::Storage,
};

#[derive(Debug, Subcommand)]
pub enum AccountCommand {
    /// Create a local account and log in.
    Register {
        /// Letters, numbers, and underscores; at least 3 characters.
        username: String,

        /// Name shown on your journals.
        #[arg(long)]
        name: String,

        /// At least 6 characters.
        #[arg(long)]
        password: String,
    },

    /// Log in to an existing account.
    Login {
        username: String,

        #[arg(long)]
        password: String,
    },

    /// Log out.
    Logout,

    /// Show who is logged in.
    Whoami,

    /// Update your profile.
    Profile {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        bio: Option<String>,

        /// Profile image path or URL.
        #[arg(long)]
        image: Option<String>,
    },
}

pub(super) fn run(storage: &Storage, command: AccountCommand) -> Result<(), String> {
    let auth = LocalAuth::new(storage);

    match command {
        AccountCommand::Register {
            username,
            name,
            password,
        } => {
            let user = auth
                .register(&username, &name, &password)
                .map_err(|e| format!("registration failed: {e}"))?;
            eprintln!("Welcome, {}", user.display_name);
            Ok(())
        }
        AccountCommand::Login { username, password } => {
            let user = auth
                .login(&username, &password)
                .map_err(|e| format!("login failed: {e}"))?;
            eprintln!("Logged in as {}", user.username);
            Ok(())
        }
        AccountCommand::Logout => auth.logout().map_err(|e| format!("logout failed: {e}")),
        AccountCommand::Whoami => {
            match auth.current_user().map_err(|e| e.to_string())? {
                Some(user) => println!("{}", describe(&user)),
                None => println!("Not logged in"),
            }
            Ok(())
        }
        AccountCommand::Profile { name, bio, image } => {
            let user = auth
                .update_profile(ProfileUpdate {
                    display_name: name,
                    bio,
                    profile_image: image,
                })
                .map_err(|e| format!("failed to update profile: {e}"))?;
            println!("{}", describe(&user));
            Ok(())
        }
    }
}

/// Username of the logged-in user, if any.
pub(super) fn current_username(storage: &Storage) -> Result<Option<String>, String> {
    LocalAuth::new(storage)
        .current_user()
        .map(|u| u.map(|u| u.username))
        .map_err(|e| format!("failed to read session: {e}"))
}

fn describe(user: &User) -> String {
    let mut out = format!("{} ({})", user.display_name, user.username);
    if let Some(bio) = &user.bio {
        out.push_str(&format!("\n{bio}"));
    }
    out
}
