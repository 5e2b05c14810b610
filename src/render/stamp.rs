//! Trailer stamp for PDF documents.
//!
//! Appends a `%Watermark: <label>` comment after the document. PDF readers
//! skip comments, so the original bytes and cross-reference offsets stay
//! valid while the label travels with the file.

use bytes::{BufMut, Bytes, BytesMut};

use crate::render::{RenderError, Watermarker};

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Stamps PDF documents with a comment trailer.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfStamp;

impl Watermarker for PdfStamp {
    fn apply(&self, document: Bytes, label: &str) -> Result<Bytes, RenderError> {
        if !document.starts_with(PDF_MAGIC) {
            return Err(RenderError::Unsupported("missing %PDF- header"));
        }
        if label.trim().is_empty() {
            return Err(RenderError::InvalidLabel("empty label"));
        }
        if label.chars().any(char::is_control) {
            return Err(RenderError::InvalidLabel("control characters in label"));
        }

        let mut out = BytesMut::with_capacity(document.len() + label.len() + 16);
        out.put_slice(&document);
        if !document.ends_with(b"\n") {
            out.put_u8(b'\n');
        }
        out.put_slice(b"%Watermark: ");
        out.put_slice(label.as_bytes());
        out.put_u8(b'\n');
        Ok(out.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &[u8] = b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\n%%EOF";

    #[test]
    fn test_original_bytes_are_preserved_in_order() {
        let out = PdfStamp.apply(Bytes::from_static(DOC), "DRAFT").unwrap();
        assert!(out.starts_with(DOC));
        assert!(out.ends_with(b"%Watermark: DRAFT\n"));
    }

    #[test]
    fn test_unicode_label() {
        let out = PdfStamp.apply(Bytes::from_static(DOC), "机密文件").unwrap();
        let tail = String::from_utf8_lossy(&out[DOC.len()..]).into_owned();
        assert_eq!(tail, "\n%Watermark: 机密文件\n");
    }

    #[test]
    fn test_rejects_non_pdf() {
        let err = PdfStamp
            .apply(Bytes::from_static(b"PK\x03\x04zip"), "x")
            .unwrap_err();
        assert!(matches!(err, RenderError::Unsupported(_)));
    }

    #[test]
    fn test_rejects_bad_labels() {
        let doc = Bytes::from_static(DOC);
        assert!(matches!(
            PdfStamp.apply(doc.clone(), "  "),
            Err(RenderError::InvalidLabel(_))
        ));
        assert!(matches!(
            PdfStamp.apply(doc, "a\nb"),
            Err(RenderError::InvalidLabel(_))
        ));
    }
}
