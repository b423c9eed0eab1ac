//! Session commands: sign in, sign up, sign out and password reset.

use secrecy::SecretString;

use shopfront_client::models::NewAccount;

use super::{CliError, Context, parse_email};
use crate::output;

/// Sign in and store the session.
pub async fn login(ctx: &Context, email: &str, password: SecretString) -> Result<(), CliError> {
    let email = parse_email(email)?;
    let session = ctx.storefront().session().sign_in(&email, &password).await?;
    ctx.persist_session().await?;
    output::print_user(&session.user);
    Ok(())
}

/// Create an account, sign in and store the session.
pub async fn register(
    ctx: &Context,
    name: String,
    email: &str,
    phone: String,
    password: SecretString,
) -> Result<(), CliError> {
    let account = NewAccount {
        name,
        email: parse_email(email)?,
        password,
        phone,
    };
    let session = ctx.storefront().session().sign_up(&account).await?;
    ctx.persist_session().await?;
    output::print_user(&session.user);
    Ok(())
}

/// Sign out and remove the stored session.
pub async fn logout(ctx: &Context) -> Result<(), CliError> {
    ctx.forget_session().await
}

/// Print the signed-in user, if any.
pub fn whoami(ctx: &Context) {
    match ctx.storefront().session().user() {
        Some(user) => output::print_user(&user),
        None => output::print_line("Not signed in"),
    }
}

/// Ask the server to email a reset code.
pub async fn forgot_password(ctx: &Context, email: &str) -> Result<(), CliError> {
    let email = parse_email(email)?;
    ctx.storefront().session().forgot_password(&email).await?;
    Ok(())
}

/// Check a reset code.
pub async fn verify_reset_code(ctx: &Context, code: &str) -> Result<(), CliError> {
    ctx.storefront().session().verify_reset_code(code).await?;
    Ok(())
}

/// Set a new password, sign in and store the session.
pub async fn reset_password(
    ctx: &Context,
    email: &str,
    new_password: SecretString,
) -> Result<(), CliError> {
    let email = parse_email(email)?;
    let session = ctx
        .storefront()
        .session()
        .reset_password(&email, &new_password)
        .await?;
    ctx.persist_session().await?;
    output::print_user(&session.user);
    Ok(())
}
