/// Delivery policy for script files
/// Decides content type and Content-Disposition from the file name, the client and the route hit

pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Text,
    Binary,
}

impl FileKind {
    /// Only `.sh` and `.txt` (exact, case-sensitive suffix) count as text.
    pub fn classify(name: &str) -> Self {
        if name.ends_with(".sh") || name.ends_with(".txt") {
            FileKind::Text
        } else {
            FileKind::Binary
        }
    }

    pub fn is_text(self) -> bool {
        self == FileKind::Text
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientKind {
    ScriptAgent,
    Browser,
}

const SCRIPT_AGENT_MARKERS: [&str; 3] = ["curl", "Wget", "fetch"];

impl ClientKind {
    pub fn from_user_agent(user_agent: Option<&str>) -> Self {
        let user_agent = user_agent.unwrap_or("");
        if SCRIPT_AGENT_MARKERS
            .iter()
            .any(|marker| user_agent.contains(marker))
        {
            ClientKind::ScriptAgent
        } else {
            ClientKind::Browser
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `/:name`
    Direct,
    /// `/raw/:name`, always inline
    Raw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Attachment,
    Inline,
}

impl Disposition {
    pub fn as_str(self) -> &'static str {
        match self {
            Disposition::Attachment => "attachment",
            Disposition::Inline => "inline",
        }
    }

    pub fn header_value(self, filename: &str) -> String {
        format!("{}; filename=\"{}\"", self.as_str(), filename)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryDecision {
    pub kind: FileKind,
    /// `None` leaves the content type to the static file service.
    pub content_type: Option<&'static str>,
    /// `None` means no Content-Disposition header is set.
    pub disposition: Option<Disposition>,
    pub filename: String,
}

impl DeliveryDecision {
    pub fn content_disposition(&self) -> Option<String> {
        self.disposition
            .map(|disposition| disposition.header_value(&self.filename))
    }
}

pub fn decide(name: &str, user_agent: Option<&str>, route: Route) -> DeliveryDecision {
    let kind = FileKind::classify(name);

    // Binary files are passed through untouched on both routes
    if !kind.is_text() {
        return DeliveryDecision {
            kind,
            content_type: None,
            disposition: None,
            filename: name.to_string(),
        };
    }

    let disposition = match route {
        Route::Raw => Disposition::Inline,
        Route::Direct => match ClientKind::from_user_agent(user_agent) {
            ClientKind::ScriptAgent => Disposition::Attachment,
            ClientKind::Browser => Disposition::Inline,
        },
    };

    DeliveryDecision {
        kind,
        content_type: Some(TEXT_CONTENT_TYPE),
        disposition: Some(disposition),
        filename: name.to_string(),
    }
}
