use google_sheets4::{hyper, hyper_rustls, Sheets};
use std::future::Future;
use std::io::{self, BufRead};
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, info};
use yup_oauth2::authenticator_delegate::InstalledFlowDelegate;
use yup_oauth2::{InstalledFlowAuthenticator, InstalledFlowReturnMethod};

use crate::cfg::{AuthFlow, Cfg};
use crate::error::{Error, Result};
use crate::sheets::Hub;
use crate::token::FileTokenStorage;

/// Source of the one-time authorization code for the consent flow.
pub trait CodePrompt: Send + Sync {
    fn authorization_code(&self, url: &str) -> Result<String>;
}

/// Prints the consent URL and reads the code from stdin.
pub struct ConsolePrompt;

impl CodePrompt for ConsolePrompt {
    fn authorization_code(&self, url: &str) -> Result<String> {
        println!(
            "Go to the following link in your browser then type the authorization code: \n{url}"
        );

        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| Error::Auth(format!("Unable to read authorization code: {e}")))?;

        let code = line.trim();
        if code.is_empty() {
            return Err(Error::Auth("Unable to read authorization code: empty input".into()));
        }
        Ok(code.to_string())
    }
}

/// Bridges the authenticator's URL callback to a [`CodePrompt`].
struct PromptDelegate {
    prompt: Arc<dyn CodePrompt>,
}

impl InstalledFlowDelegate for PromptDelegate {
    fn present_user_url<'a>(
        &'a self,
        url: &'a str,
        need_code: bool,
    ) -> Pin<Box<dyn Future<Output = std::result::Result<String, String>> + Send + 'a>> {
        Box::pin(async move {
            if !need_code {
                println!("Open the following link in your browser to authorize access: \n{url}");
                return Ok(String::new());
            }

            let prompt = Arc::clone(&self.prompt);
            let url = url.to_string();
            tokio::task::spawn_blocking(move || prompt.authorization_code(&url))
                .await
                .map_err(|e| e.to_string())?
                .map_err(|e| e.to_string())
        })
    }
}

/// Builds an authorized Sheets hub, running the consent flow when no usable
/// token is cached.
pub async fn obtain_client(cfg: &Cfg, prompt: Arc<dyn CodePrompt>) -> Result<Hub> {
    info!("Initializing Google Sheets authentication");

    let secret = yup_oauth2::read_application_secret(&cfg.credentials_path)
        .await
        .map_err(|e| match e.kind() {
            io::ErrorKind::InvalidData => {
                Error::Auth(format!("Unable to parse client secret file to config: {e}"))
            }
            _ => Error::Config(format!(
                "Unable to read client secret file {}: {e}",
                cfg.credentials_path.display()
            )),
        })?;

    let method = match cfg.auth_flow {
        AuthFlow::Interactive => InstalledFlowReturnMethod::Interactive,
        AuthFlow::Redirect => InstalledFlowReturnMethod::HTTPRedirect,
    };
    debug!("Using {:?} consent flow", cfg.auth_flow);

    let https = hyper_rustls::HttpsConnectorBuilder::new()
        .with_native_roots()
        .map_err(|e| Error::Auth(format!("could not load native TLS roots: {e}")))?
        .https_or_http()
        .enable_http1()
        .build();
    let client = hyper::Client::builder().build::<_, hyper::Body>(https);

    let auth = InstalledFlowAuthenticator::builder(secret, method)
        .with_storage(Box::new(FileTokenStorage::new(&cfg.token_path)))
        .flow_delegate(Box::new(PromptDelegate { prompt }))
        .hyper_client(client.clone())
        .build()
        .await
        .map_err(|e| Error::Auth(format!("could not create an authenticator: {e}")))?;

    // Resolve the token now so consent and exchange failures surface before any sheet call.
    auth.token(&[cfg.scope.as_str()])
        .await
        .map_err(|e| Error::Auth(format!("Unable to retrieve token from web: {e}")))?;

    info!("Authenticated with scope {}", cfg.scope);
    Ok(Sheets::new(client, auth))
}
