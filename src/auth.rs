/// Single shared passcode guarding the whole app.
#[derive(Debug, Clone)]
pub struct PasscodeGate {
    expected: Option<String>,
}

impl PasscodeGate {
    pub fn new(expected: Option<String>) -> Self {
        if expected.is_none() {
            log::warn!("No passcode configured; the gate is open");
        }
        Self { expected }
    }

    /// Whether the gate lets everyone through.
    pub fn is_open(&self) -> bool {
        self.expected.is_none()
    }

    /// Compare an entered passcode against the configured one.
    pub fn verify(&self, entered: &str) -> bool {
        match &self.expected {
            None => true,
            Some(expected) => constant_time_eq(expected.as_bytes(), entered.as_bytes()),
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatch() {
        let gate = PasscodeGate::new(Some("s3cret".into()));
        assert!(!gate.is_open());
        assert!(gate.verify("s3cret"));
        assert!(!gate.verify("s3cret "));
        assert!(!gate.verify("S3CRET"));
        assert!(!gate.verify(""));
    }

    #[test]
    fn unconfigured_gate_is_open() {
        let gate = PasscodeGate::new(None);
        assert!(gate.is_open());
        assert!(gate.verify("anything"));
    }
}
