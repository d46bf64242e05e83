//! Delivery of sign-in links.

use std::fmt::Debug;

use crate::Error;

/// Sends a sign-in link to a user's inbox.
pub trait Mailer: Debug + Send + Sync {
    /// Deliver `link` to `email`.
    ///
    /// # Errors
    ///
    /// Returns [Error::MailerError] if the link could not be delivered.
    fn send_sign_in_link(&self, email: &str, link: &str) -> Result<(), Error>;
}

/// A [Mailer] that writes sign-in links to the server log.
///
/// Useful for development and for single user deployments where the operator
/// can read the logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send_sign_in_link(&self, email: &str, link: &str) -> Result<(), Error> {
        tracing::info!("Sign-in link for {email}: {link}");

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_mailer {
    use std::sync::Mutex;

    use crate::Error;

    use super::Mailer;

    /// Records every link it is asked to send.
    #[derive(Debug, Default)]
    pub struct RecordingMailer {
        pub sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingMailer {
        pub fn last_link(&self) -> Option<String> {
            self.sent
                .lock()
                .unwrap()
                .last()
                .map(|(_, link)| link.clone())
        }
    }

    impl Mailer for RecordingMailer {
        fn send_sign_in_link(&self, email: &str, link: &str) -> Result<(), Error> {
            self.sent
                .lock()
                .unwrap()
                .push((email.to_owned(), link.to_owned()));

            Ok(())
        }
    }

    /// Fails every delivery.
    #[derive(Debug, Default)]
    pub struct FailingMailer;

    impl Mailer for FailingMailer {
        fn send_sign_in_link(&self, _email: &str, _link: &str) -> Result<(), Error> {
            Err(Error::MailerError("smtp unavailable".to_owned()))
        }
    }
}
