/// The key used to store a pending exchange. Codes are never stored in the
/// clear: the key carries the hex encoded SHA-256 digest of the code.
pub fn auth_code(code_digest: &str) -> String {
	format!("authCode:{}", code_digest)
}

#[cfg(test)]
mod tests {
	#[test]
	fn auth_code_keys_are_namespaced() {
		assert_eq!(super::auth_code("ab12"), "authCode:ab12");
	}
}
