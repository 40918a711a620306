// db/pg_types.rs
// Column type classification by OID and wire-format decoders for the
// types whose library decoders lose information.

use std::fmt::Write;

/// How a column's values are decoded. Anything without a kind is unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Bool,
    Int2,
    Int4,
    Int8,
    Float4,
    Float8,
    Numeric,
    Text,
    Date,
    Timestamp,
    TimestampTz,
    Time,
    Uuid,
    Json,
    Jsonb,
    Bytes,
}

// Built-in OIDs from pg_type; fixed across server versions.
const BOOL_OID: u32 = 16;
const BYTEA_OID: u32 = 17;
const NAME_OID: u32 = 19;
const INT8_OID: u32 = 20;
const INT2_OID: u32 = 21;
const INT4_OID: u32 = 23;
const TEXT_OID: u32 = 25;
const JSON_OID: u32 = 114;
const FLOAT4_OID: u32 = 700;
const FLOAT8_OID: u32 = 701;
const BPCHAR_OID: u32 = 1042;
const VARCHAR_OID: u32 = 1043;
const DATE_OID: u32 = 1082;
const TIME_OID: u32 = 1083;
const TIMESTAMP_OID: u32 = 1114;
const TIMESTAMPTZ_OID: u32 = 1184;
const NUMERIC_OID: u32 = 1700;
const UUID_OID: u32 = 2950;
const JSONB_OID: u32 = 3802;

pub fn column_kind(oid: u32) -> Option<ColumnKind> {
    let kind = match oid {
        BOOL_OID => ColumnKind::Bool,
        INT2_OID => ColumnKind::Int2,
        INT4_OID => ColumnKind::Int4,
        INT8_OID => ColumnKind::Int8,
        FLOAT4_OID => ColumnKind::Float4,
        FLOAT8_OID => ColumnKind::Float8,
        NUMERIC_OID => ColumnKind::Numeric,
        TEXT_OID | VARCHAR_OID | BPCHAR_OID | NAME_OID => ColumnKind::Text,
        DATE_OID => ColumnKind::Date,
        TIMESTAMP_OID => ColumnKind::Timestamp,
        TIMESTAMPTZ_OID => ColumnKind::TimestampTz,
        TIME_OID => ColumnKind::Time,
        UUID_OID => ColumnKind::Uuid,
        JSON_OID => ColumnKind::Json,
        JSONB_OID => ColumnKind::Jsonb,
        BYTEA_OID => ColumnKind::Bytes,
        _ => return None,
    };
    Some(kind)
}

/// A NUMERIC value as the server sent it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumericText {
    /// Canonical decimal text with the value's display scale, e.g. `0.0000`.
    Number(String),
    NaN,
    Infinity,
    NegInfinity,
}

const NUMERIC_POS: u16 = 0x0000;
const NUMERIC_NEG: u16 = 0x4000;
const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_PINF: u16 = 0xD000;
const NUMERIC_NINF: u16 = 0xF000;
const NBASE: i16 = 10000;

/// Renders the binary NUMERIC format: ndigits, weight, sign, dscale
/// (all 16-bit big-endian) followed by ndigits base-10000 digits.
pub fn decode_numeric(buf: &[u8]) -> Result<NumericText, String> {
    let word = |i: usize| -> Option<[u8; 2]> { Some([*buf.get(i)?, *buf.get(i + 1)?]) };
    let header = |i: usize| word(i).ok_or_else(|| format!("numeric header truncated ({} bytes)", buf.len()));

    let ndigits = i16::from_be_bytes(header(0)?);
    let weight = i16::from_be_bytes(header(2)?);
    let sign = u16::from_be_bytes(header(4)?);
    let dscale = u16::from_be_bytes(header(6)?);

    match sign {
        NUMERIC_NAN => return Ok(NumericText::NaN),
        NUMERIC_PINF => return Ok(NumericText::Infinity),
        NUMERIC_NINF => return Ok(NumericText::NegInfinity),
        NUMERIC_POS | NUMERIC_NEG => {}
        other => return Err(format!("invalid numeric sign {:#06x}", other)),
    }
    if ndigits < 0 || buf.len() != 8 + 2 * ndigits as usize {
        return Err(format!("numeric has {} bytes for {} digits", buf.len(), ndigits));
    }
    let digits = (0..ndigits as usize)
        .map(|i| {
            let d = i16::from_be_bytes(header(8 + 2 * i)?);
            if (0..NBASE).contains(&d) {
                Ok(d)
            } else {
                Err(format!("invalid numeric digit {}", d))
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    let digit_at = |pos: i32| -> i16 {
        usize::try_from(pos).ok().and_then(|p| digits.get(p).copied()).unwrap_or(0)
    };

    let mut out = String::new();
    if sign == NUMERIC_NEG {
        out.push('-');
    }
    if weight < 0 {
        out.push('0');
    } else {
        for pos in 0..=i32::from(weight) {
            let _ = if pos == 0 {
                write!(out, "{}", digit_at(pos))
            } else {
                write!(out, "{:04}", digit_at(pos))
            };
        }
    }
    if dscale > 0 {
        let mut frac = String::new();
        let mut pos = i32::from(weight) + 1;
        while frac.len() < usize::from(dscale) {
            let _ = write!(frac, "{:04}", digit_at(pos));
            pos += 1;
        }
        frac.truncate(usize::from(dscale));
        out.push('.');
        out.push_str(&frac);
    }
    Ok(NumericText::Number(out))
}

const JSONB_VERSION: u8 = 1;

/// JSON text exactly as stored; `jsonb` carries a one-byte version prefix.
pub fn decode_json(buf: &[u8], jsonb: bool) -> Result<String, String> {
    let text = if jsonb {
        match buf.split_first() {
            Some((&JSONB_VERSION, rest)) => rest,
            Some((v, _)) => return Err(format!("unsupported jsonb version {}", v)),
            None => return Err("empty jsonb value".to_string()),
        }
    } else {
        buf
    };
    std::str::from_utf8(text)
        .map(str::to_string)
        .map_err(|e| format!("json is not valid UTF-8: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric(weight: i16, sign: u16, dscale: u16, digits: &[i16]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(digits.len() as i16).to_be_bytes());
        buf.extend_from_slice(&weight.to_be_bytes());
        buf.extend_from_slice(&sign.to_be_bytes());
        buf.extend_from_slice(&dscale.to_be_bytes());
        for d in digits {
            buf.extend_from_slice(&d.to_be_bytes());
        }
        buf
    }

    fn number(s: &str) -> NumericText {
        NumericText::Number(s.to_string())
    }

    #[test]
    fn every_supported_oid_has_a_kind() {
        let cases = [
            (16, ColumnKind::Bool),
            (21, ColumnKind::Int2),
            (23, ColumnKind::Int4),
            (20, ColumnKind::Int8),
            (700, ColumnKind::Float4),
            (701, ColumnKind::Float8),
            (1700, ColumnKind::Numeric),
            (25, ColumnKind::Text),
            (1043, ColumnKind::Text),
            (1042, ColumnKind::Text),
            (19, ColumnKind::Text),
            (1082, ColumnKind::Date),
            (1114, ColumnKind::Timestamp),
            (1184, ColumnKind::TimestampTz),
            (1083, ColumnKind::Time),
            (2950, ColumnKind::Uuid),
            (114, ColumnKind::Json),
            (3802, ColumnKind::Jsonb),
            (17, ColumnKind::Bytes),
        ];
        for (oid, kind) in cases {
            assert_eq!(column_kind(oid), Some(kind), "oid {}", oid);
        }
    }

    #[test]
    fn fixed_width_char_columns_are_text() {
        assert_eq!(column_kind(BPCHAR_OID), Some(ColumnKind::Text));
    }

    #[test]
    fn unsupported_oids_have_no_kind() {
        // "char", interval, int4[], timetz, inet
        for oid in [18, 1186, 1007, 1266, 869] {
            assert_eq!(column_kind(oid), None, "oid {}", oid);
        }
    }

    #[test]
    fn numeric_keeps_display_scale() {
        assert_eq!(decode_numeric(&numeric(0, NUMERIC_POS, 4, &[123, 4560])).unwrap(), number("123.4560"));
        assert_eq!(decode_numeric(&numeric(0, NUMERIC_POS, 2, &[2000])).unwrap(), number("2000.00"));
        assert_eq!(decode_numeric(&numeric(0, NUMERIC_POS, 2, &[123, 4500])).unwrap(), number("123.45"));
    }

    #[test]
    fn numeric_zero_keeps_declared_scale() {
        assert_eq!(decode_numeric(&numeric(0, NUMERIC_POS, 4, &[])).unwrap(), number("0.0000"));
        assert_eq!(decode_numeric(&numeric(0, NUMERIC_POS, 0, &[])).unwrap(), number("0"));
    }

    #[test]
    fn numeric_handles_small_negative_and_wide_values() {
        assert_eq!(decode_numeric(&numeric(-2, NUMERIC_POS, 8, &[1234])).unwrap(), number("0.00001234"));
        assert_eq!(decode_numeric(&numeric(-1, NUMERIC_NEG, 1, &[5000])).unwrap(), number("-0.5"));
        assert_eq!(decode_numeric(&numeric(2, NUMERIC_POS, 0, &[1])).unwrap(), number("100000000"));
        // 40 significant digits, beyond any fixed-precision decimal type
        let digits = [1234, 5678, 9012, 3456, 7890, 1234, 5678, 9012, 3456, 7890];
        assert_eq!(
            decode_numeric(&numeric(9, NUMERIC_POS, 0, &digits)).unwrap(),
            number("1234567890123456789012345678901234567890")
        );
    }

    #[test]
    fn numeric_special_values() {
        assert_eq!(decode_numeric(&numeric(0, NUMERIC_NAN, 0, &[])).unwrap(), NumericText::NaN);
        assert_eq!(decode_numeric(&numeric(0, NUMERIC_PINF, 0, &[])).unwrap(), NumericText::Infinity);
        assert_eq!(decode_numeric(&numeric(0, NUMERIC_NINF, 0, &[])).unwrap(), NumericText::NegInfinity);
    }

    #[test]
    fn malformed_numeric_is_rejected() {
        assert!(decode_numeric(&[0, 1, 0]).is_err());
        let mut short = numeric(0, NUMERIC_POS, 0, &[1, 2]);
        short.truncate(10);
        assert!(decode_numeric(&short).is_err());
        assert!(decode_numeric(&numeric(0, NUMERIC_POS, 0, &[10000])).is_err());
        assert!(decode_numeric(&numeric(0, 0x1234, 0, &[1])).is_err());
    }

    #[test]
    fn json_text_is_kept_verbatim() {
        let raw = br#"{"z": 1, "a": 12345678901234567890123, "z": 2}"#;
        assert_eq!(decode_json(raw, false).unwrap(), r#"{"z": 1, "a": 12345678901234567890123, "z": 2}"#);
    }

    #[test]
    fn jsonb_strips_version_byte() {
        let mut raw = vec![JSONB_VERSION];
        raw.extend_from_slice(br#"{"b": 1, "a": 12345678901234567890123}"#);
        assert_eq!(decode_json(&raw, true).unwrap(), r#"{"b": 1, "a": 12345678901234567890123}"#);
        assert!(decode_json(&[2, b'{', b'}'], true).is_err());
        assert!(decode_json(&[], true).is_err());
        assert!(decode_json(&[0xff], false).is_err());
    }
}
