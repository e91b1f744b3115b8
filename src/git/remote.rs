#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remote {
    pub name: String,
    pub fetch_url: Option<String>,
    pub push_url: Option<String>,
}

impl Remote {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fetch_url: None,
            push_url: None,
        }
    }

    pub fn with_urls(mut self, fetch_url: Option<&str>, push_url: Option<&str>) -> Self {
        self.fetch_url = fetch_url.map(str::to_string);
        self.push_url = push_url.map(str::to_string);
        self
    }
}
