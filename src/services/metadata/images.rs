use super::{Extraction, Metadata, MetadataValue};
use anyhow::anyhow;
use exif::{Context, Exif, Field, In, Tag, Value};
use image::{ImageDecoder, ImageFormat, ImageReader};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Key prefix for tags found in the EXIF block handed back by the image decoder
pub const EMBEDDED_TAG_PREFIX: &str = "Embedded ";

const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// Raw EXIF value, kept typed until the result is assembled
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Text(String),
    Integer(Vec<i64>),
    Rational(Vec<(i64, i64)>),
    Real(Vec<f64>),
    Bytes(Vec<u8>),
}

impl TagValue {
    fn from_exif(value: &Value) -> Option<Self> {
        let tag = match value {
            Value::Ascii(parts) => TagValue::Text(
                parts
                    .iter()
                    .map(|part| String::from_utf8_lossy(part).trim_end_matches('\0').to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            Value::Byte(v) => TagValue::Integer(v.iter().map(|&n| i64::from(n)).collect()),
            Value::Short(v) => TagValue::Integer(v.iter().map(|&n| i64::from(n)).collect()),
            Value::Long(v) => TagValue::Integer(v.iter().map(|&n| i64::from(n)).collect()),
            Value::SByte(v) => TagValue::Integer(v.iter().map(|&n| i64::from(n)).collect()),
            Value::SShort(v) => TagValue::Integer(v.iter().map(|&n| i64::from(n)).collect()),
            Value::SLong(v) => TagValue::Integer(v.iter().map(|&n| i64::from(n)).collect()),
            Value::Rational(v) => TagValue::Rational(
                v.iter()
                    .map(|r| (i64::from(r.num), i64::from(r.denom)))
                    .collect(),
            ),
            Value::SRational(v) => TagValue::Rational(
                v.iter()
                    .map(|r| (i64::from(r.num), i64::from(r.denom)))
                    .collect(),
            ),
            Value::Float(v) => TagValue::Real(v.iter().map(|&n| f64::from(n)).collect()),
            Value::Double(v) => TagValue::Real(v.clone()),
            Value::Undefined(bytes, _) => TagValue::Bytes(bytes.clone()),
            _ => return None,
        };
        Some(tag)
    }
}

fn write_list<T, F>(f: &mut fmt::Formatter<'_>, items: &[T], mut item: F) -> fmt::Result
where
    F: FnMut(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
{
    if let [single] = items {
        return item(f, single);
    }
    f.write_str("[")?;
    for (i, value) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        item(f, value)?;
    }
    f.write_str("]")
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.abs()
}

fn write_ratio(f: &mut fmt::Formatter<'_>, &(num, denom): &(i64, i64)) -> fmt::Result {
    let divisor = gcd(num, denom);
    let (num, denom) = if divisor > 1 {
        (num / divisor, denom / divisor)
    } else {
        (num, denom)
    };
    if denom == 1 {
        write!(f, "{num}")
    } else {
        write!(f, "{num}/{denom}")
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Text(text) => f.write_str(text),
            TagValue::Integer(values) => write_list(f, values, |f, n| write!(f, "{n}")),
            TagValue::Rational(values) => write_list(f, values, write_ratio),
            TagValue::Real(values) => write_list(f, values, |f, n| write!(f, "{n}")),
            TagValue::Bytes(bytes) => {
                let trimmed = bytes
                    .iter()
                    .rposition(|&b| b != 0)
                    .map_or(&bytes[..0], |end| &bytes[..=end]);
                if !trimmed.is_empty() && trimmed.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
                    f.write_str(&String::from_utf8_lossy(trimmed))
                } else {
                    write_list(f, bytes, |f, b| write!(f, "{b}"))
                }
            }
        }
    }
}

/// exifread-style group label: "Image", "Thumbnail", "EXIF", "GPS" or "Interoperability"
fn group_name(field: &Field) -> &'static str {
    match field.tag.context() {
        Context::Exif => "EXIF",
        Context::Gps => "GPS",
        Context::Interop => "Interoperability",
        _ if field.ifd_num == In::THUMBNAIL => "Thumbnail",
        _ => "Image",
    }
}

fn collect_tags<F>(exif: &Exif, mut key: F) -> Vec<(String, TagValue)>
where
    F: FnMut(&Field) -> Option<String>,
{
    exif.fields()
        .filter(|field| field.tag != Tag::MakerNote)
        .filter_map(|field| Some((key(field)?, TagValue::from_exif(&field.value)?)))
        .collect()
}

/// First pass: every tag the EXIF container parser can recover
fn read_raw_tags(path: &Path) -> anyhow::Result<Vec<(String, TagValue)>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let exif = match exif::Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    Ok(collect_tags(&exif, |field| {
        Some(format!("{} {}", group_name(field), field.tag))
    }))
}

struct DecodedImage {
    format: ImageFormat,
    width: u32,
    height: u32,
    embedded: Vec<(String, TagValue)>,
}

/// Second pass: content-sniffed decoder for format, dimensions and its EXIF block
fn decode_image(path: &Path) -> anyhow::Result<DecodedImage> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let format = reader
        .format()
        .ok_or_else(|| anyhow!("cannot identify image file"))?;

    let mut decoder = reader.into_decoder()?;
    let (width, height) = decoder.dimensions();

    let embedded = match decoder.exif_metadata()? {
        Some(raw) => {
            let raw = match raw.strip_prefix(EXIF_HEADER) {
                Some(rest) => rest.to_vec(),
                None => raw,
            };
            let exif = exif::Reader::new().read_raw(raw)?;
            collect_tags(&exif, |field| {
                (field.ifd_num == In::PRIMARY)
                    .then(|| format!("{EMBEDDED_TAG_PREFIX}{}", field.tag))
            })
        }
        None => Vec::new(),
    };

    Ok(DecodedImage {
        format,
        width,
        height,
        embedded,
    })
}

fn format_name(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "JPEG".to_string(),
        ImageFormat::Png => "PNG".to_string(),
        other => format!("{other:?}").to_uppercase(),
    }
}

fn insert_tags(fields: &mut Metadata, tags: Vec<(String, TagValue)>) {
    for (key, value) in tags {
        fields.insert(key, MetadataValue::Text(value.to_string()));
    }
}

fn exif_error(e: anyhow::Error) -> String {
    format!("Erro ao ler EXIF: {e}")
}

/// Extract EXIF tags plus format and dimensions from a JPEG or PNG.
///
/// Read failures never escape: they come back as an `"error"` entry, and tags
/// from the raw pass survive a failure in the decoder pass.
pub fn extract_image_metadata(path: &Path) -> Extraction {
    let mut fields = Metadata::new();

    match read_raw_tags(path) {
        Ok(tags) => insert_tags(&mut fields, tags),
        Err(e) => {
            tracing::debug!("Raw EXIF pass failed for {}: {}", path.display(), e);
            return Extraction::Failed(exif_error(e));
        }
    }

    match decode_image(path) {
        Ok(decoded) => {
            insert_tags(&mut fields, decoded.embedded);
            fields.insert("Image Format".to_string(), format_name(decoded.format).into());
            fields.insert(
                "Image Size".to_string(),
                format!("{}x{}", decoded.width, decoded.height).into(),
            );
            Extraction::Complete(fields)
        }
        Err(e) => {
            tracing::debug!("Image decode failed for {}: {}", path.display(), e);
            Extraction::interrupted(fields, exif_error(e))
        }
    }
}
