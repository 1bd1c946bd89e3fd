/// Acknowledgement discipline negotiated on SUBSCRIBE's `ack` header.
/// Defaults to [`AckMode::Auto`] when the header is absent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AckMode {
	Auto,
	Client,
	ClientIndividual,
}

impl AckMode {
	pub fn parse(value: Option<&str>) -> Self {
		match value {
			Some("client") => Self::Client,
			Some("client-individual") => Self::ClientIndividual,
			_ => Self::Auto,
		}
	}

	pub fn requires_ack(&self) -> bool {
		!matches!(self, Self::Auto)
	}
}
