//! [`Command`] for authorizing an owner [`Session`].

use derive_more::{Display, Error, From};
use jsonwebtoken::Validation;
use tracerr::Traced;

use crate::{
    domain::owner::{session, Session},
    Service,
};

use super::Command;

/// [`Command`] for authorizing an owner [`Session`].
#[derive(Clone, Debug, From)]
pub struct AuthorizeSession {
    /// [`Session`] token to authorize.
    pub token: session::Token,
}

impl<Db, Nt> Command<AuthorizeSession> for Service<Db, Nt> {
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeSession { token } = cmd;

        let session = jsonwebtoken::decode::<Session>(
            token.as_ref(),
            &self.config.jwt_decoding_key,
            &Validation::default(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?
        .claims;

        Ok(session)
    }
}

/// Error of [`AuthorizeSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`jsonwebtoken`] decoding error.
    #[display("Failed to decode a JSON Web Token: {_0}")]
    JsonWebTokenDecodeError(jsonwebtoken::errors::Error),
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;
    use jsonwebtoken::Header;

    use crate::domain::owner;

    use super::*;

    #[tokio::test]
    async fn decodes_valid_token() {
        let service = Service::in_memory();
        let owner_id = owner::Id::new();
        let token = service.issue_token(
            owner_id,
            (DateTime::now() + Duration::from_secs(3600)).coerce(),
        );

        let session =
            service.execute(AuthorizeSession { token }).await.unwrap();

        assert_eq!(session.owner_id, owner_id);
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let service = Service::in_memory();
        let token = service.issue_token(
            owner::Id::new(),
            DateTime::from_unix_timestamp(1_000_000).unwrap().coerce(),
        );

        let err =
            service.execute(AuthorizeSession { token }).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::JsonWebTokenDecodeError(_),
        ));
    }

    #[tokio::test]
    async fn rejects_garbage_token() {
        let service = Service::in_memory();
        let token = "not.a.jwt".parse::<session::Token>().unwrap();

        let err =
            service.execute(AuthorizeSession { token }).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::JsonWebTokenDecodeError(_),
        ));
    }

    #[tokio::test]
    async fn rejects_foreign_signature() {
        let service = Service::in_memory();
        let foreign = jsonwebtoken::encode(
            &Header::default(),
            &Session {
                owner_id: owner::Id::new(),
                expires_at: (DateTime::now() + Duration::from_secs(3600))
                    .coerce(),
            },
            &jsonwebtoken::EncodingKey::from_secret(b"wrong secret"),
        )
        .unwrap()
        .parse::<session::Token>()
        .unwrap();

        let err = service
            .execute(AuthorizeSession { token: foreign })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::JsonWebTokenDecodeError(_),
        ));
    }
}
