use reqchain_core::hash::base64_url_decode;

/// One challenge of a `WWW-Authenticate` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    /// Authentication scheme, as sent by the server.
    pub scheme: String,
    /// Auth params in the order they were sent, quotes removed.
    pub params: Vec<(String, String)>,
}

impl Challenge {
    /// Check the scheme, ignoring case.
    pub fn is_scheme(&self, scheme: &str) -> bool {
        self.scheme.eq_ignore_ascii_case(scheme)
    }

    /// Get a param by name, ignoring case.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Parse every challenge of a `WWW-Authenticate` header value.
///
/// Malformed input never fails: whatever can be recognised is returned.
pub fn parse_challenges(header: &str) -> Vec<Challenge> {
    let mut cur = Cursor { s: header, pos: 0 };
    let mut challenges = Vec::new();

    loop {
        cur.skip(|c| c.is_ascii_whitespace() || c == ',');
        let scheme = cur.token();
        if scheme.is_empty() {
            break;
        }

        let mut challenge = Challenge {
            scheme: scheme.to_string(),
            params: Vec::new(),
        };

        loop {
            cur.skip(|c| c.is_ascii_whitespace());
            let start = cur.pos;
            let name = cur.token();
            cur.skip(|c| c.is_ascii_whitespace());

            if name.is_empty() || cur.peek() != Some('=') {
                // Not a param, so it starts the next challenge.
                cur.pos = start;
                break;
            }
            cur.bump();

            // token68, such as `Basic dXNlcg==`
            if matches!(cur.peek(), None | Some('=') | Some(',')) {
                cur.skip(|c| c == '=');
                challenge
                    .params
                    .push((String::new(), cur.s[start..cur.pos].to_string()));
                break;
            }

            cur.skip(|c| c.is_ascii_whitespace());
            let value = if cur.peek() == Some('"') {
                cur.quoted()
            } else {
                cur.value().to_string()
            };
            challenge.params.push((name.to_string(), value));

            cur.skip(|c| c.is_ascii_whitespace());
            if cur.peek() == Some(',') {
                cur.bump();
            } else {
                break;
            }
        }

        challenges.push(challenge);
    }

    challenges
}

/// Extract the decoded claims of a Bearer `insufficient_claims` challenge.
///
/// Returns `None` if the header carries no such challenge, or if its claims
/// are empty or not valid base64url encoded utf-8.
pub fn insufficient_claims(header: &str) -> Option<String> {
    let challenge = parse_challenges(header)
        .into_iter()
        .find(|c| c.is_scheme("Bearer") && c.param("error") == Some("insufficient_claims"))?;

    let encoded = challenge.param("claims").filter(|v| !v.is_empty())?;
    let decoded = base64_url_decode(encoded).ok()?;
    String::from_utf8(decoded).ok().filter(|v| !v.is_empty())
}

struct Cursor<'a> {
    s: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<char> {
        self.s[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip(&mut self, f: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !f(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn token(&mut self) -> &'a str {
        let start = self.pos;
        self.skip(|c| !(c.is_ascii_whitespace() || c == ',' || c == '=' || c == '"'));
        &self.s[start..self.pos]
    }

    /// Read an unquoted param value, which may contain `=`.
    fn value(&mut self) -> &'a str {
        let start = self.pos;
        self.skip(|c| !(c.is_ascii_whitespace() || c == ',' || c == '"'));
        &self.s[start..self.pos]
    }

    /// Read a quoted string, the cursor must be on the opening quote.
    fn quoted(&mut self) -> String {
        self.bump();
        let mut value = String::new();
        while let Some(c) = self.peek() {
            self.bump();
            match c {
                '"' => break,
                '\\' => {
                    if let Some(escaped) = self.peek() {
                        value.push(escaped);
                        self.bump();
                    }
                }
                c => value.push(c),
            }
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn params(v: &[(&str, &str)]) -> Vec<(String, String)> {
        v.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_single_challenge() {
        let got = parse_challenges(
            r#"Bearer authorization_uri="https://login.example.com/tenant", error="insufficient_claims", claims="eyJ9""#,
        );

        assert_eq!(
            got,
            vec![Challenge {
                scheme: "Bearer".to_string(),
                params: params(&[
                    ("authorization_uri", "https://login.example.com/tenant"),
                    ("error", "insufficient_claims"),
                    ("claims", "eyJ9"),
                ]),
            }]
        );
    }

    #[test]
    fn test_parse_multiple_challenges() {
        let got = parse_challenges(r#"Basic realm="localhost", Bearer error=invalid_token, PoP"#);

        assert_eq!(got.len(), 3);
        assert!(got[0].is_scheme("basic"));
        assert_eq!(got[0].param("realm"), Some("localhost"));
        assert!(got[1].is_scheme("bearer"));
        assert_eq!(got[1].param("ERROR"), Some("invalid_token"));
        assert!(got[2].is_scheme("PoP"));
        assert!(got[2].params.is_empty());
    }

    #[test]
    fn test_parse_token68() {
        let got = parse_challenges("Basic dXNlcjpwYXNz==, Bearer realm=\"a\"");

        assert_eq!(got.len(), 2);
        assert_eq!(got[0].params, params(&[("", "dXNlcjpwYXNz==")]));
        assert_eq!(got[1].param("realm"), Some("a"));
    }

    #[test]
    fn test_parse_unquoted_value_with_padding() {
        let got = parse_challenges(
            "Bearer error=insufficient_claims, claims=eyJhIjoxfQ==, Basic realm=\"b\"",
        );

        assert_eq!(got.len(), 2);
        assert_eq!(got[0].param("claims"), Some("eyJhIjoxfQ=="));
        assert!(got[1].is_scheme("basic"));
        assert_eq!(got[1].param("realm"), Some("b"));
    }

    #[test]
    fn test_parse_quoted_escapes() {
        let got = parse_challenges(r#"Bearer realm="say \"hi\", then, leave""#);

        assert_eq!(got[0].param("realm"), Some(r#"say "hi", then, leave"#));
    }

    #[test_case(""; "empty")]
    #[test_case("   ,  "; "separators only")]
    fn test_parse_nothing(header: &str) {
        assert!(parse_challenges(header).is_empty());
    }

    #[test_case(
        r#"Bearer error="insufficient_claims", claims="eyJhY2Nlc3NfdG9rZW4iOnsiZm9vIjoiYmFyIn19""#,
        Some(r#"{"access_token":{"foo":"bar"}}"#);
        "unpadded"
    )]
    #[test_case(
        r#"Bearer realm="", error="insufficient_claims", claims="eyJhY2Nlc3NfdG9rZW4iOnsiZm9vIjoiYmFyIn19""#,
        Some(r#"{"access_token":{"foo":"bar"}}"#);
        "with realm"
    )]
    #[test_case(
        r#"Bearer error="insufficient_claims", claims="eyJhY2Nlc3NfdG9rZW4iOnsibmJmIjp7ImVzc2VudGlhbCI6dHJ1ZSwgInZhbHVlIjoiMTYwMzc0MjgwMCJ9fX0=""#,
        Some(r#"{"access_token":{"nbf":{"essential":true, "value":"1603742800"}}}"#);
        "padded"
    )]
    #[test_case(
        "Bearer error=insufficient_claims, claims=eyJhY2Nlc3NfdG9rZW4iOnsibmJmIjp7ImVzc2VudGlhbCI6dHJ1ZSwgInZhbHVlIjoiMTYwMzc0MjgwMCJ9fX0=",
        Some(r#"{"access_token":{"nbf":{"essential":true, "value":"1603742800"}}}"#);
        "unquoted padded"
    )]
    #[test_case(r#"Bearer error="invalid_token", claims="eyJ9""#, None; "other error")]
    #[test_case(r#"Bearer error="insufficient_claims""#, None; "missing claims")]
    #[test_case(r#"Bearer error="insufficient_claims", claims="""#, None; "empty claims")]
    #[test_case(r#"Bearer error="insufficient_claims", claims="!!!""#, None; "invalid base64")]
    #[test_case(r#"Basic error="insufficient_claims", claims="eyJ9""#, None; "not bearer")]
    fn test_insufficient_claims(header: &str, expected: Option<&str>) {
        assert_eq!(insufficient_claims(header).as_deref(), expected);
    }
}
