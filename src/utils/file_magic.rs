//! 上传内容嗅探
//!
//! 只看首个数据块的开头字节，判断内容是否与声明的扩展名一致。

const ZIP: &[u8] = &[0x50, 0x4B, 0x03, 0x04];
const OLE: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF];

/// 内容签名
enum Signature {
    Prefix(&'static [u8]),
    AnyPrefix(&'static [&'static [u8]]),
    Riff(&'static [u8; 4]),
    /// 纯文本类，不做检查
    Text,
}

impl Signature {
    fn matches(&self, data: &[u8]) -> bool {
        match self {
            Signature::Prefix(prefix) => data.starts_with(prefix),
            Signature::AnyPrefix(prefixes) => prefixes.iter().any(|p| data.starts_with(p)),
            Signature::Riff(kind) => {
                data.len() >= 12 && data.starts_with(b"RIFF") && data[8..12] == kind[..]
            }
            Signature::Text => true,
        }
    }
}

fn signature_for(extension: &str) -> Option<Signature> {
    let ext = extension.trim_start_matches('.').to_ascii_lowercase();
    let signature = match ext.as_str() {
        // Office 文档：OOXML/ODF 都是 zip 容器，旧格式为 OLE
        "docx" | "xlsx" | "pptx" | "odt" | "ods" | "odp" | "odg" | "zip" => Signature::Prefix(ZIP),
        "doc" | "xls" | "ppt" => Signature::Prefix(OLE),
        "pdf" => Signature::Prefix(b"%PDF"),
        "rtf" => Signature::Prefix(b"{\\rtf"),

        "png" => Signature::Prefix(PNG),
        "jpg" | "jpeg" => Signature::Prefix(JPEG),
        "gif" => Signature::AnyPrefix(&[b"GIF87a", b"GIF89a"]),
        "webp" => Signature::Riff(b"WEBP"),
        "wav" => Signature::Riff(b"WAVE"),
        "mp3" => Signature::AnyPrefix(&[b"ID3", &[0xFF, 0xFB]]),

        "txt" | "md" | "csv" | "json" | "xml" | "html" => Signature::Text,
        _ => return None,
    };
    Some(signature)
}

/// 内容与扩展名相符时返回 true；空内容与未知扩展名一律拒绝
pub fn validate_magic_bytes(data: &[u8], extension: &str) -> bool {
    !data.is_empty() && signature_for(extension).is_some_and(|s| s.matches(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_office_formats() {
        let zip = [0x50, 0x4B, 0x03, 0x04, 0x14, 0x00];
        for ext in [".docx", "xlsx", ".PPTX", ".odt"] {
            assert!(validate_magic_bytes(&zip, ext), "{ext}");
        }
        assert!(!validate_magic_bytes(&zip, ".doc"));
        assert!(validate_magic_bytes(OLE, ".xls"));
    }

    #[test]
    fn test_riff_containers_are_told_apart() {
        let webp = b"RIFF\x10\x00\x00\x00WEBPVP8 ";
        assert!(validate_magic_bytes(webp, ".webp"));
        assert!(!validate_magic_bytes(webp, ".wav"));
    }

    #[test]
    fn test_text_and_unknown() {
        assert!(validate_magic_bytes(b"Hallo Welt", ".txt"));
        assert!(!validate_magic_bytes(b"", ".txt"));
        assert!(!validate_magic_bytes(b"MZ\x90\x00", ".exe"));
    }
}
