//! SMTP [`Notifier`] implementation.

use common::operations::Notify;
use derive_more::{Debug, Display, Error as StdError, From};
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport as _, Message, Tokio1Executor,
};
use secrecy::{ExposeSecret as _, SecretString};
use tracerr::Traced;

use crate::{domain::notification::Email, infra::notification};
#[cfg(doc)]
use crate::infra::Notifier;

/// SMTP [`Notifier`] client.
#[derive(Clone, Debug)]
pub struct Smtp {
    /// [`Mailbox`] to send [`Email`]s from.
    from: Mailbox,

    /// SMTP transport to send [`Email`]s over.
    #[debug(skip)]
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl Smtp {
    /// Creates a new [`Smtp`] client with the provided [`Config`].
    ///
    /// # Errors
    ///
    /// If the provided [`Config`] doesn't describe a usable SMTP relay.
    pub fn new(conf: &Config) -> Result<Self, Traced<notification::Error>> {
        let from = conf
            .from
            .parse()
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        let transport =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&conf.host)
                .map_err(tracerr::from_and_wrap!(=> Error))
                .map_err(tracerr::map_from)?
                .port(conf.port)
                .credentials(Credentials::new(
                    conf.user.clone(),
                    conf.password.expose_secret().to_owned(),
                ))
                .build();
        Ok(Self { from, transport })
    }
}

impl notification::Notifier<Notify<Email>> for Smtp {
    type Ok = ();
    type Err = Traced<notification::Error>;

    async fn execute(
        &self,
        Notify(email): Notify<Email>,
    ) -> Result<Self::Ok, Self::Err> {
        let to: &str = email.to.as_ref();
        let message = Message::builder()
            .from(self.from.clone())
            .to(Mailbox::new(
                None,
                to.parse()
                    .map_err(tracerr::from_and_wrap!(=> Error))
                    .map_err(tracerr::map_from)?,
            ))
            .subject(email.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(email.body)
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        self.transport
            .send(message)
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
            .map(drop)
    }
}

/// Configuration of an [`Smtp`] client.
#[derive(Clone, Debug)]
pub struct Config {
    /// Host of the SMTP relay to connect to.
    pub host: String,

    /// Port of the SMTP relay to connect to.
    pub port: u16,

    /// Username to authenticate on the SMTP relay with.
    pub user: String,

    /// Password to authenticate on the SMTP relay with.
    pub password: SecretString,

    /// Address to send [`Email`]s from.
    pub from: String,
}

/// SMTP [`Notifier`] [`Error`].
#[derive(Debug, Display, StdError, From)]
pub enum Error {
    /// Email address cannot be parsed.
    #[display("`Address` error: {_0}")]
    Address(lettre::address::AddressError),

    /// [`Message`] cannot be assembled.
    #[display("Failed to assemble a `Message`: {_0}")]
    Message(lettre::error::Error),

    /// SMTP transport error.
    #[display("SMTP transport error: {_0}")]
    Transport(lettre::transport::smtp::Error),
}
