//! 全角编码（full width encoding）
//! 参考 http://www.kb.cert.org/vuls/id/739224
//! 每个非保护字节 b 编码为 `%uFF` + (b - 0x20) 的两位小写十六进制
//! 保护分隔符原样输出；b < 0x20 无法平移，输出标准百分号转义 `%XX`

use std::borrow::Cow;

use percent_encoding::percent_decode;

/// 不参与编码的分隔符
pub const PROTECTED: [u8; 7] = [b'?', b'/', b'&', b'\\', b'=', b'%', b'+'];

/// 全角平移量（取自 UFF00 码表）
pub const SHIFT: u8 = 0x20;

const FULL_WIDTH_PREFIX: &str = "%uFF";
const HEX_LOWER: &[u8; 16] = b"0123456789abcdef";
const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// 全角编码器，纯函数，无状态
pub struct FullWidthEncoder;

impl FullWidthEncoder {
    #[inline(always)]
    pub fn is_protected(b: u8) -> bool {
        PROTECTED.contains(&b)
    }

    /// 先做一次百分号解码，再逐字节编码（解码后重编码，避免二次编码）
    pub fn mutate(input: &str) -> String {
        Self::mutate_bytes(input.as_bytes())
    }

    pub fn mutate_bytes(input: &[u8]) -> String {
        let decoded: Cow<'_, [u8]> = percent_decode(input).into();
        Self::encode(&decoded)
    }

    /// 对已解码字节直接编码
    pub fn encode(decoded: &[u8]) -> String {
        let mut out = String::with_capacity(decoded.len() * 6);
        for &b in decoded {
            if Self::is_protected(b) {
                out.push(char::from(b));
            } else if b < SHIFT {
                out.push('%');
                push_hex(&mut out, b, HEX_UPPER);
            } else {
                out.push_str(FULL_WIDTH_PREFIX);
                push_hex(&mut out, b - SHIFT, HEX_LOWER);
            }
        }
        out
    }

    /// 逆映射：还原 `%uFFxx` 与 `%XX`，其余字节原样保留
    pub fn decode(encoded: &str) -> Vec<u8> {
        let bytes = encoded.as_bytes();
        let mut out = Vec::with_capacity(bytes.len());
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'%' {
                if bytes[i..].starts_with(FULL_WIDTH_PREFIX.as_bytes()) {
                    if let Some(offset) = hex_pair(&bytes[i + 4..]) {
                        // 偏移超过 0xDF 的序列不可能由编码产生
                        if let Some(original) = offset.checked_add(SHIFT) {
                            out.push(original);
                            i += 6;
                            continue;
                        }
                    }
                } else if let Some(b) = hex_pair(&bytes[i + 1..]) {
                    out.push(b);
                    i += 3;
                    continue;
                }
            }
            out.push(bytes[i]);
            i += 1;
        }
        out
    }
}

#[inline(always)]
fn push_hex(out: &mut String, b: u8, table: &[u8; 16]) {
    out.push(char::from(table[usize::from(b >> 4)]));
    out.push(char::from(table[usize::from(b & 0x0f)]));
}

#[inline(always)]
fn hex_pair(bytes: &[u8]) -> Option<u8> {
    match bytes {
        [hi, lo, ..] => {
            let hi = char::from(*hi).to_digit(16)?;
            let lo = char::from(*lo).to_digit(16)?;
            u8::try_from(hi * 16 + lo).ok()
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutate_hola_mundo() {
        assert_eq!(
            FullWidthEncoder::mutate("/hola-mundo"),
            "/%uFF48%uFF4f%uFF4c%uFF41%uFF0d%uFF4d%uFF55%uFF4e%uFF44%uFF4f"
        );
    }

    #[test]
    fn test_protected_only_input_is_unchanged() {
        let t = "?/&\\=+/?&";
        assert_eq!(FullWidthEncoder::mutate(t), t);
        assert_eq!(FullWidthEncoder::encode(b"%%"), "%%");
    }

    #[test]
    fn test_each_unprotected_char_becomes_six_chars() {
        let t = "abcXYZ019 ~!@#$^*()[]{}<>'\"";
        let out = FullWidthEncoder::mutate(t);
        assert_eq!(out.len(), 6 * t.len());
        assert!(out.split("%uFF").skip(1).all(|chunk| chunk.len() == 2));
    }

    #[test]
    fn test_space_maps_to_zero_offset() {
        assert_eq!(FullWidthEncoder::mutate(" "), "%uFF00");
    }

    #[test]
    fn test_existing_percent_escapes_are_decoded_first() {
        // %20 先解码为空格，再编码为 %uFF00；%25 解码为受保护的 %
        assert_eq!(FullWidthEncoder::mutate("a%20b"), "%uFF41%uFF00%uFF42");
        assert_eq!(FullWidthEncoder::mutate("%25"), "%");
        // + 不解码为空格
        assert_eq!(FullWidthEncoder::mutate("a+b"), "%uFF41+%uFF42");
    }

    #[test]
    fn test_control_bytes_use_plain_percent_escape() {
        assert_eq!(FullWidthEncoder::encode(b"\n\t\x00"), "%0A%09%00");
        assert_eq!(FullWidthEncoder::decode("%0A%09%00"), b"\n\t\x00".to_vec());
    }

    #[test]
    fn test_multibyte_utf8_encodes_per_byte() {
        // é = C3 A9
        assert_eq!(FullWidthEncoder::mutate("é"), "%uFFa3%uFF89");
        assert_eq!(FullWidthEncoder::decode("%uFFa3%uFF89"), "é".as_bytes().to_vec());
    }

    #[test]
    fn test_round_trip_printable_ascii() {
        let printable: String = (0x20u8..0x7f).map(char::from).collect();
        // 输入需已解码：先移除 %，否则 mutate 会把 %xx 当转义处理
        let t: String = printable.chars().filter(|c| *c != '%').collect();
        let encoded = FullWidthEncoder::mutate(&t);
        assert_eq!(FullWidthEncoder::decode(&encoded), t.as_bytes().to_vec());
    }

    #[test]
    fn test_decode_passes_through_unknown_sequences() {
        assert_eq!(FullWidthEncoder::decode("%uFFzz%"), b"%uFFzz%".to_vec());
        assert_eq!(FullWidthEncoder::decode("%uFFff"), b"%uFFff".to_vec());
        assert_eq!(FullWidthEncoder::decode("plain"), b"plain".to_vec());
    }
}
