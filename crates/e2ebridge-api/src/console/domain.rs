// Domain user and group administration through the console.

use secrecy::{ExposeSecret, SecretString};

use crate::console::client::ConsoleClient;
use crate::error::Error;

impl ConsoleClient {
    pub async fn create_group(&self, id: &str, name: &str) -> Result<(), Error> {
        let fields = [("id", id), ("name", name)];
        self.with_session(|| self.post_form("/DomainGroupCreate", &fields, &[]))
            .await
            .map(drop)
    }

    pub async fn delete_group(&self, id: &str) -> Result<(), Error> {
        let fields = [("id", id)];
        self.with_session(|| self.post_form("/DomainGroupDelete", &fields, &[]))
            .await
            .map(drop)
    }

    /// Create a domain user in `group`.
    pub async fn create_user(
        &self,
        id: &str,
        name: &str,
        password: &SecretString,
        group: &str,
    ) -> Result<(), Error> {
        let fields = [
            ("id", id),
            ("name", name),
            ("password", password.expose_secret()),
            ("group", group),
        ];
        self.with_session(|| self.post_form("/DomainUserCreate", &fields, &[]))
            .await
            .map(drop)
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), Error> {
        let fields = [("id", id)];
        self.with_session(|| self.post_form("/DomainUserDelete", &fields, &[]))
            .await
            .map(drop)
    }
}
