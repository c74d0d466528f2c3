//! The table of `mod_log_config` format directives.
//!
//! Directives come in two flavours. Fixed directives are a single character
//! (`%h`, `%s`, `%t`, ...) and always capture into the same field. Parameterized
//! directives carry a braced name (`%{Referer}i`, `%{session}C`, `%{local}p`) and
//! capture into a field named after their category and that name, so the same
//! directive letter can appear several times in one format with different names.

const IPV4: &str = r"\d+\.\d+\.\d+\.\d+";
const METHODS: &str = "GET|POST|HEAD|PUT|DELETE|OPTIONS|PATCH|CONNECT|TRACE";
const LAZY: &str = ".+?";

/// A single-character directive and the field it captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDirective {
    /// The directive character following `%`.
    pub code: char,
    /// Name of the capture group.
    pub field: &'static str,
    /// Regex matching the field value.
    pub value: &'static str,
    /// Literal regex emitted before the capture group.
    pub prefix: &'static str,
    /// Literal regex emitted after the capture group.
    pub suffix: &'static str,
}

const fn fixed(code: char, field: &'static str, value: &'static str) -> FixedDirective {
    FixedDirective {
        code,
        field,
        value,
        prefix: "",
        suffix: "",
    }
}

/// All fixed directives. `%p` and `%P` are handled as parameterized defaults.
pub const FIXED: &[FixedDirective] = &[
    fixed('a', "remoteIP", IPV4),
    fixed('A', "localIP", IPV4),
    fixed('b', "lengthCLF", r"-|\d+"),
    fixed('B', "length", r"\d+"),
    fixed('D', "requestTimeMicro", r"\d+"),
    fixed('f', "filename", LAZY),
    fixed('h', "host", IPV4),
    fixed('H', "protocol", LAZY),
    fixed('k', "keepalive", r"\d+"),
    fixed('l', "logname", r"-|[A-Za-z0-9_]+"),
    fixed('m', "method", METHODS),
    fixed('q', "queryString", ".*?"),
    fixed(
        'r',
        "request",
        r"(?:GET|POST|HEAD|PUT|DELETE|OPTIONS|PATCH|CONNECT|TRACE) .+? HTTP/1\.[01]",
    ),
    fixed('s', "status", r"\d{3}"),
    FixedDirective {
        code: 't',
        field: "time",
        value: r"\d{2}/(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)/\d{4}:\d{2}:\d{2}:\d{2} [+-]?\d{4}",
        prefix: r"\[",
        suffix: r"\]",
    },
    fixed('T', "requestTime", r"\d+"),
    fixed('u', "user", r"-|[A-Za-z0-9_]+"),
    fixed('U', "URL", LAZY),
    fixed('v', "serverName", LAZY),
    fixed('V', "canonicalName", LAZY),
    fixed('X', "connectionStatus", r"[X+\-]"),
    fixed('I', "recBytes", r"\d+"),
    fixed('O', "sentBytes", r"\d+"),
];

/// Which port `%{...}p` logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortKind {
    Canonical,
    Local,
    Remote,
}

impl PortKind {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "canonical" => Some(Self::Canonical),
            "local" => Some(Self::Local),
            "remote" => Some(Self::Remote),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Canonical => "canonical",
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

/// Which process identifier `%{...}P` logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PidKind {
    Pid,
    Tid,
    HexTid,
    HexId,
}

impl PidKind {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "pid" => Some(Self::Pid),
            "tid" => Some(Self::Tid),
            "hextid" => Some(Self::HexTid),
            "hexid" => Some(Self::HexId),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pid => "pid",
            Self::Tid => "tid",
            Self::HexTid => "hextid",
            Self::HexId => "hexid",
        }
    }
}

/// The parameterized directive families, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamRule {
    Cookie,
    Env,
    ReqHeader,
    Note,
    RespHeader,
    Port,
    Pid,
    LocTime,
}

impl ParamRule {
    /// Matching order. Earlier rules win.
    pub const ORDERED: [ParamRule; 8] = [
        ParamRule::Cookie,
        ParamRule::Env,
        ParamRule::ReqHeader,
        ParamRule::Note,
        ParamRule::RespHeader,
        ParamRule::Port,
        ParamRule::Pid,
        ParamRule::LocTime,
    ];

    /// The directive letter that closes `%{name}X`.
    pub fn letter(self) -> char {
        match self {
            Self::Cookie => 'C',
            Self::Env => 'e',
            Self::ReqHeader => 'i',
            Self::Note => 'n',
            Self::RespHeader => 'o',
            Self::Port => 'p',
            Self::Pid => 'P',
            Self::LocTime => 't',
        }
    }

    /// Field name prefix, joined to the sanitized name with `___`.
    pub fn category(self) -> &'static str {
        match self {
            Self::Cookie => "cookie",
            Self::Env => "env",
            Self::ReqHeader => "reqHeader",
            Self::Note => "note",
            Self::RespHeader => "respHeader",
            Self::Port => "port",
            Self::Pid => "pid",
            Self::LocTime => "locTime",
        }
    }

    /// Build a directive if `letter` and `name` have this rule's shape.
    fn accept(self, name: &str, letter: char) -> Option<Directive> {
        if letter != self.letter() || name.is_empty() {
            return None;
        }
        let sanitized = sanitize_name(name);
        match self {
            Self::Cookie => Some(Directive::Cookie(sanitized)),
            Self::LocTime => Some(Directive::LocTime(sanitized)),
            Self::Env if is_word(name) => Some(Directive::Env(sanitized)),
            Self::ReqHeader if is_word(name) => Some(Directive::ReqHeader(sanitized)),
            Self::Note if is_word(name) => Some(Directive::Note(sanitized)),
            Self::RespHeader if is_word(name) => Some(Directive::RespHeader(sanitized)),
            Self::Port => PortKind::from_name(name).map(Directive::Port),
            Self::Pid => PidKind::from_name(name).map(Directive::Pid),
            _ => None,
        }
    }
}

fn is_word(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Normalize a user-supplied name for use in a field name.
///
/// Lower-cases, drops hyphens, and replaces anything that is not an ASCII
/// alphanumeric or `_` with `_`, so the result is always a valid capture
/// group name.
///
/// The mapping is lossy: `a.b` and `a_b`, or `A-B` and `ab`, sanitize to the
/// same string. Two such directives of the same family in one format are
/// rejected by the compiler as a duplicate field.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|&c| c != '-')
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// One resolved directive, ready to be turned into a capture group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Fixed(&'static FixedDirective),
    Cookie(String),
    Env(String),
    ReqHeader(String),
    Note(String),
    RespHeader(String),
    Port(PortKind),
    Pid(PidKind),
    LocTime(String),
}

impl Directive {
    /// The rule this directive belongs to, or `None` for fixed directives.
    pub fn rule(&self) -> Option<ParamRule> {
        match self {
            Self::Fixed(_) => None,
            Self::Cookie(_) => Some(ParamRule::Cookie),
            Self::Env(_) => Some(ParamRule::Env),
            Self::ReqHeader(_) => Some(ParamRule::ReqHeader),
            Self::Note(_) => Some(ParamRule::Note),
            Self::RespHeader(_) => Some(ParamRule::RespHeader),
            Self::Port(_) => Some(ParamRule::Port),
            Self::Pid(_) => Some(ParamRule::Pid),
            Self::LocTime(_) => Some(ParamRule::LocTime),
        }
    }

    /// Name of the capture group this directive produces.
    pub fn field_name(&self) -> String {
        let name = match self {
            Self::Fixed(fixed) => return fixed.field.to_string(),
            Self::Cookie(name)
            | Self::Env(name)
            | Self::ReqHeader(name)
            | Self::Note(name)
            | Self::RespHeader(name)
            | Self::LocTime(name) => name.as_str(),
            Self::Port(kind) => kind.as_str(),
            Self::Pid(kind) => kind.as_str(),
        };
        match self.rule() {
            Some(rule) => param_field_name(rule, name),
            None => name.to_string(),
        }
    }

    /// Regex matching the field value, without the surrounding group.
    pub fn value_pattern(&self) -> &'static str {
        match self {
            Self::Fixed(fixed) => fixed.value,
            Self::Port(_) => r"\d+",
            Self::Pid(_) => r"[a-fA-F\d]+",
            _ => LAZY,
        }
    }

    /// The full regex fragment, including the named group.
    pub fn fragment(&self) -> String {
        let (prefix, suffix) = match self {
            Self::Fixed(fixed) => (fixed.prefix, fixed.suffix),
            _ => ("", ""),
        };
        format!(
            "{}(?P<{}>{}){}",
            prefix,
            self.field_name(),
            self.value_pattern(),
            suffix
        )
    }
}

/// Compose the field name for a parameterized directive from an already
/// sanitized name.
pub(crate) fn param_field_name(rule: ParamRule, sanitized: &str) -> String {
    format!("{}___{}", rule.category(), sanitized)
}

/// Look up a single-character directive.
pub fn lookup_fixed(code: char) -> Option<Directive> {
    match code {
        'p' => Some(Directive::Port(PortKind::Canonical)),
        'P' => Some(Directive::Pid(PidKind::Pid)),
        _ => FIXED
            .iter()
            .find(|d| d.code == code)
            .map(Directive::Fixed),
    }
}

/// Resolve a `{name}X` token against the parameterized rules.
///
/// The token runs from the opening brace through the directive letter. Rules
/// are tried in [`ParamRule::ORDERED`] order and the first that accepts wins.
pub fn match_parameterized(token: &str) -> Option<Directive> {
    let inner = token.strip_prefix('{')?;
    let close = inner.find('}')?;
    let name = &inner[..close];
    let mut rest = inner[close + 1..].chars();
    let letter = rest.next()?;
    if rest.next().is_some() {
        return None;
    }

    ParamRule::ORDERED
        .iter()
        .find_map(|rule| rule.accept(name, letter))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_fixed() {
        let d = lookup_fixed('h').unwrap();
        assert_eq!(d.field_name(), "host");
        assert_eq!(d.value_pattern(), IPV4);
        assert!(lookup_fixed('Q').is_none());
        assert!(lookup_fixed('>').is_none());
    }

    #[test]
    fn test_fixed_codes_are_unique() {
        for (i, a) in FIXED.iter().enumerate() {
            for b in &FIXED[i + 1..] {
                assert_ne!(a.code, b.code);
                assert_ne!(a.field, b.field);
            }
        }
    }

    #[test]
    fn test_time_brackets_outside_group() {
        let d = lookup_fixed('t').unwrap();
        let fragment = d.fragment();
        assert!(fragment.starts_with(r"\[(?P<time>"));
        assert!(fragment.ends_with(r")\]"));
    }

    #[test]
    fn test_user_and_logname_are_ascii_words() {
        for code in ['l', 'u'] {
            let d = lookup_fixed(code).unwrap();
            let re = regex::Regex::new(&format!("^{}$", d.fragment())).unwrap();
            assert!(re.is_match("-"));
            assert!(re.is_match("frank_01"));
            assert!(!re.is_match("josé"));
            assert!(!re.is_match("Ωmega"));
        }
    }

    #[test]
    fn test_bare_port_and_pid() {
        assert_eq!(lookup_fixed('p').unwrap().field_name(), "port___canonical");
        assert_eq!(lookup_fixed('P').unwrap().field_name(), "pid___pid");
    }

    #[test]
    fn test_match_headers() {
        let d = match_parameterized("{User-agent}i").unwrap();
        assert_eq!(d, Directive::ReqHeader("useragent".to_string()));
        assert_eq!(d.field_name(), "reqHeader___useragent");

        let d = match_parameterized("{Content-Type}o").unwrap();
        assert_eq!(d.field_name(), "respHeader___contenttype");
    }

    #[test]
    fn test_match_each_category() {
        let cases = [
            ("{SESSION.id}C", "cookie___session_id"),
            ("{UNIQUE_ID}e", "env___unique_id"),
            ("{mod-note}n", "note___modnote"),
            ("{local}p", "port___local"),
            ("{remote}p", "port___remote"),
            ("{hextid}P", "pid___hextid"),
            ("{%d/%b/%Y}t", "locTime____d__b__y"),
        ];
        for (token, field) in cases {
            let d = match_parameterized(token).unwrap_or_else(|| panic!("{}", token));
            assert_eq!(d.field_name(), field, "{}", token);
        }
    }

    #[test]
    fn test_match_rejects() {
        assert!(match_parameterized("{bogus}p").is_none());
        assert!(match_parameterized("{thread}P").is_none());
        assert!(match_parameterized("{Referer}Z").is_none());
        assert!(match_parameterized("{a b}i").is_none());
        assert!(match_parameterized("{}i").is_none());
        assert!(match_parameterized("{Referer}").is_none());
        assert!(match_parameterized("{Referer}ii").is_none());
        assert!(match_parameterized("Referer}i").is_none());
    }

    #[test]
    fn test_ordered_letters_are_distinct() {
        for (i, a) in ParamRule::ORDERED.iter().enumerate() {
            for b in &ParamRule::ORDERED[i + 1..] {
                assert_ne!(a.letter(), b.letter());
            }
        }
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("User-Agent"), "useragent");
        assert_eq!(sanitize_name("X_Forwarded-For"), "x_forwardedfor");
        assert_eq!(sanitize_name("a.b c"), "a_b_c");
    }
}
