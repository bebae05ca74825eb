// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Encoding related utils.

use crate::Error;
use base64::prelude::BASE64_STANDARD;
use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use base64::Engine;

/// Base64 encode
pub fn base64_encode(content: &[u8]) -> String {
    BASE64_STANDARD.encode(content)
}

/// Base64 decode
pub fn base64_decode(content: &str) -> crate::Result<Vec<u8>> {
    BASE64_STANDARD
        .decode(content)
        .map_err(|e| Error::unexpected("base64 decode failed").with_source(e))
}

/// Base64url decode, accepting input with or without `=` padding.
pub fn base64_url_decode(content: &str) -> crate::Result<Vec<u8>> {
    BASE64_URL_SAFE_NO_PAD
        .decode(content.trim_end_matches('='))
        .map_err(|e| Error::unexpected("base64url decode failed").with_source(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const NBF_CLAIMS: &str = r#"{"access_token":{"nbf":{"essential":true,"value":"1726077595"}}}"#;

    #[test_case("eyJhY2Nlc3NfdG9rZW4iOnsibmJmIjp7ImVzc2VudGlhbCI6dHJ1ZSwidmFsdWUiOiIxNzI2MDc3NTk1In19fQ"; "unpadded")]
    #[test_case("eyJhY2Nlc3NfdG9rZW4iOnsibmJmIjp7ImVzc2VudGlhbCI6dHJ1ZSwidmFsdWUiOiIxNzI2MDc3NTk1In19fQ=="; "padded")]
    fn test_base64_url_decode(input: &str) {
        let decoded = base64_url_decode(input).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), NBF_CLAIMS);
    }

    #[test]
    fn test_base64_url_decode_uses_url_alphabet() {
        // 0xfb 0xff encodes to `-_8` in the url-safe alphabet.
        assert_eq!(base64_url_decode("-_8").unwrap(), vec![0xfb, 0xff]);
        assert!(base64_url_decode("+/8").is_err());
    }

    #[test]
    fn test_base64_round_trip() {
        let encoded = base64_encode(b"reqchain");
        assert_eq!(base64_decode(&encoded).unwrap(), b"reqchain");
    }
}
