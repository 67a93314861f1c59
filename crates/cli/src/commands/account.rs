//! Account commands.

use qkart_core::Notice;
use qkart_storefront::Storefront;
use qkart_storefront::notify::Notifier;

use super::CliError;

/// `qkart login <username> --password <password>`
pub async fn login(storefront: &Storefront, username: &str, password: &str) -> Result<(), CliError> {
    storefront.auth().login(username, password).await?;

    let session = storefront.session();
    storefront
        .notifier()
        .notify(Notice::success("Logged in successfully"));
    storefront.notifier().notify(Notice::info(format!(
        "{} has a wallet balance of {}",
        session.username().unwrap_or_default(),
        session.balance()
    )));
    Ok(())
}

/// `qkart register <username> --password <password> --confirm <password>`
pub async fn register(
    storefront: &Storefront,
    username: &str,
    password: &str,
    confirm: &str,
) -> Result<(), CliError> {
    storefront.auth().register(username, password, confirm).await?;
    storefront
        .notifier()
        .notify(Notice::success("Registered successfully"));
    Ok(())
}

/// `qkart logout`
pub fn logout(storefront: &Storefront) -> Result<(), CliError> {
    storefront.auth().logout()?;
    storefront.notifier().notify(Notice::success("Logged out"));
    Ok(())
}
