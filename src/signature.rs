//! JPEG XL signature detection from magic bytes.

/// Bare codestream magic.
const CODESTREAM_MAGIC: [u8; 2] = [0xFF, 0x0A];

/// ISO BMFF container: a 12-byte `JXL ` signature box.
const CONTAINER_MAGIC: [u8; 12] = [
    0x00, 0x00, 0x00, 0x0C, b'J', b'X', b'L', b' ', 0x0D, 0x0A, 0x87, 0x0A,
];

/// Result of probing a buffer for a JPEG XL signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JxlSignature {
    /// The buffer is a valid prefix of a signature but too short to tell.
    NotEnoughBytes,
    /// Not a JPEG XL signature.
    Invalid,
    /// Bare JPEG XL codestream (`FF 0A`).
    Codestream,
    /// ISO BMFF container holding a JPEG XL codestream.
    Container,
}

impl JxlSignature {
    /// Probe the start of `data` for a JPEG XL signature.
    pub fn check(data: &[u8]) -> JxlSignature {
        match data.first() {
            None => JxlSignature::NotEnoughBytes,
            Some(0xFF) => {
                if data.len() < CODESTREAM_MAGIC.len() {
                    JxlSignature::NotEnoughBytes
                } else if data[1] == CODESTREAM_MAGIC[1] {
                    JxlSignature::Codestream
                } else {
                    JxlSignature::Invalid
                }
            }
            Some(0x00) => {
                let n = data.len().min(CONTAINER_MAGIC.len());
                if data[..n] != CONTAINER_MAGIC[..n] {
                    JxlSignature::Invalid
                } else if n < CONTAINER_MAGIC.len() {
                    JxlSignature::NotEnoughBytes
                } else {
                    JxlSignature::Container
                }
            }
            Some(_) => JxlSignature::Invalid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codestream_magic() {
        assert_eq!(JxlSignature::check(&[0xFF, 0x0A]), JxlSignature::Codestream);
        assert_eq!(
            JxlSignature::check(&[0xFF, 0x0A, 0x12, 0x34]),
            JxlSignature::Codestream
        );
    }

    #[test]
    fn container_magic() {
        assert_eq!(JxlSignature::check(&CONTAINER_MAGIC), JxlSignature::Container);
        let mut long = CONTAINER_MAGIC.to_vec();
        long.extend_from_slice(b"payload");
        assert_eq!(JxlSignature::check(&long), JxlSignature::Container);
    }

    #[test]
    fn short_prefixes_are_inconclusive() {
        assert_eq!(JxlSignature::check(&[]), JxlSignature::NotEnoughBytes);
        assert_eq!(JxlSignature::check(&[0xFF]), JxlSignature::NotEnoughBytes);
        assert_eq!(
            JxlSignature::check(&CONTAINER_MAGIC[..5]),
            JxlSignature::NotEnoughBytes
        );
    }

    #[test]
    fn rejects_other_magic() {
        assert_eq!(JxlSignature::check(b"BM6\x00"), JxlSignature::Invalid);
        assert_eq!(JxlSignature::check(&[0xFF, 0xD8]), JxlSignature::Invalid);
        assert_eq!(
            JxlSignature::check(&[0x00, 0x00, 0x00, 0x0D, b'J', b'X', b'L', b' ']),
            JxlSignature::Invalid
        );
    }
}
