use wzhosts_core_types::Sensitive;

/// A named remote-API connection descriptor as persisted in the hosts file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRecord {
    /// Unique within the store
    pub id: String,
    /// Scheme and host, e.g. `https://localhost`
    pub url: String,
    pub port: u16,
    pub username: String,
    /// Stored exactly as supplied; the store applies no encoding of its own
    pub password: Sensitive<String>,
}

impl HostRecord {
    pub fn new(
        id: impl Into<String>,
        url: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            port,
            username: username.into(),
            password: Sensitive::new(password.into()),
        }
    }

    /// Same id, connection fields taken from `fields`
    pub fn updated_from(&self, fields: &NewHost) -> Self {
        fields.clone().into_record(self.id.clone())
    }
}

/// A host submitted for insertion, whose id may still need to be derived
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHost {
    /// When `None` the repository derives one from the current timestamp
    pub id: Option<String>,
    pub url: String,
    pub port: u16,
    pub username: String,
    pub password: Sensitive<String>,
}

impl NewHost {
    pub fn new(
        url: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            url: url.into(),
            port,
            username: username.into(),
            password: Sensitive::new(password.into()),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Materialize the record under `id`, ignoring any id carried by `self`
    pub fn into_record(self, id: String) -> HostRecord {
        HostRecord {
            id,
            url: self.url,
            port: self.port,
            username: self.username,
            password: self.password,
        }
    }
}

impl From<HostRecord> for NewHost {
    fn from(record: HostRecord) -> Self {
        Self {
            id: Some(record.id),
            url: record.url,
            port: record.port,
            username: record.username,
            password: record.password,
        }
    }
}
