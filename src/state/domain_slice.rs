/// Tracks the (data, loading, error) triple of one data domain
///
/// `data` is only ever replaced as a whole: a failed fetch keeps the
/// previously loaded value so panels keep showing it next to the error.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainSlice<T> {
    /// Payload of the last successful fetch
    pub data: Option<T>,

    /// True while a fetch for this domain is in flight
    pub loading: bool,

    /// Message of the last failed fetch, cleared when a new fetch starts
    pub error: Option<String>,
}

impl<T> Default for DomainSlice<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

impl<T> DomainSlice<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters the loading state and forgets the previous error
    pub fn begin_fetch(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Stores a freshly fetched payload
    pub fn finish_success(&mut self, data: T) {
        self.data = Some(data);
        self.error = None;
        self.loading = false;
    }

    /// Records a failed fetch
    pub fn finish_failure(&mut self, message: String) {
        self.error = Some(message);
        self.loading = false;
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn clear_data(&mut self) {
        self.data = None;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}
