//! ImageJ ROI record: field model, parser and serializer.
//!
//! Layout follows ImageJ's `RoiDecoder`/`RoiEncoder` (version 228):
//!
//! - 64-byte header (magic `Iout`, type, bounds, line/sub-pixel-rect
//!   floats, styling, subtype, options, packed float param, position,
//!   header2 offset)
//! - coordinates: `n` i16 x, `n` i16 y (relative to left/top), then with
//!   the sub-pixel option `n` f32 x and `n` f32 y
//! - 64-byte header2 (c/z/t positions, name offset and length, overlay
//!   styling) followed by the UTF-16 name

use crate::encoding::{
    decode_rotated_roi_width, encode_rotated_roi_width, ByteOrder, ByteReader, ByteWriter,
};
use crate::{Error, Result};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Record magic.
pub const MAGIC: &[u8; 4] = b"Iout";
/// Version written by this crate.
pub const VERSION: u16 = 228;
/// Size of the fixed header and of header2.
pub const HEADER_SIZE: usize = 64;

// header offsets
const VERSION_OFFSET: usize = 4;
const TYPE: usize = 6;
const TOP: usize = 8;
const LEFT: usize = 10;
const BOTTOM: usize = 12;
const RIGHT: usize = 14;
const N_COORDINATES: usize = 16;
const X1: usize = 18;
const Y1: usize = 22;
const X2: usize = 26;
const Y2: usize = 30;
const STROKE_WIDTH: usize = 34;
const SHAPE_ROI_SIZE: usize = 36;
const STROKE_COLOR: usize = 40;
const FILL_COLOR: usize = 44;
const SUBTYPE: usize = 48;
const OPTIONS: usize = 50;
const ARROW_STYLE_OR_ASPECT_RATIO: usize = 52;
const ARROW_HEAD_SIZE: usize = 53;
const ROUNDED_RECT_ARC_SIZE: usize = 54;
const POSITION: usize = 56;
const HEADER2_OFFSET: usize = 60;

// header2 offsets
const C_POSITION: usize = 4;
const Z_POSITION: usize = 8;
const T_POSITION: usize = 12;
const NAME_OFFSET: usize = 16;
const NAME_LENGTH: usize = 20;
const OVERLAY_LABEL_COLOR: usize = 24;
const OVERLAY_FONT_SIZE: usize = 28;
const GROUP: usize = 30;
const IMAGE_OPACITY: usize = 31;
const IMAGE_SIZE: usize = 32;
const FLOAT_STROKE_WIDTH: usize = 36;

/// ImageJ ROI type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum RoiType {
    Polygon = 0,
    Rect = 1,
    Oval = 2,
    Line = 3,
    Freeline = 4,
    Polyline = 5,
    NoRoi = 6,
    Freehand = 7,
    Traced = 8,
    Angle = 9,
    Point = 10,
}

impl RoiType {
    /// Creates a type from its header byte.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRecord`] for unknown codes.
    pub fn from_code(code: u8) -> Result<Self> {
        Ok(match code {
            0 => RoiType::Polygon,
            1 => RoiType::Rect,
            2 => RoiType::Oval,
            3 => RoiType::Line,
            4 => RoiType::Freeline,
            5 => RoiType::Polyline,
            6 => RoiType::NoRoi,
            7 => RoiType::Freehand,
            8 => RoiType::Traced,
            9 => RoiType::Angle,
            10 => RoiType::Point,
            _ => return Err(Error::InvalidRecord(format!("unknown ROI type code {code}"))),
        })
    }

    /// Header byte for this type.
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Whether records of this type carry a vertex list.
    #[must_use]
    pub fn has_coordinates(self) -> bool {
        !matches!(
            self,
            RoiType::Rect | RoiType::Oval | RoiType::Line | RoiType::NoRoi
        )
    }

    /// Upper-case ImageJ name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RoiType::Polygon => "POLYGON",
            RoiType::Rect => "RECT",
            RoiType::Oval => "OVAL",
            RoiType::Line => "LINE",
            RoiType::Freeline => "FREELINE",
            RoiType::Polyline => "POLYLINE",
            RoiType::NoRoi => "NOROI",
            RoiType::Freehand => "FREEHAND",
            RoiType::Traced => "TRACED",
            RoiType::Angle => "ANGLE",
            RoiType::Point => "POINT",
        }
    }
}

impl fmt::Display for RoiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ImageJ ROI subtype codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RoiSubtype {
    #[default]
    Undefined,
    Text,
    Arrow,
    Ellipse,
    Image,
    RotatedRect,
    /// Code this crate does not know; kept so records round-trip.
    Other(i16),
}

impl RoiSubtype {
    /// Creates a subtype from its header short.
    #[must_use]
    pub fn from_code(code: i16) -> Self {
        match code {
            0 => RoiSubtype::Undefined,
            1 => RoiSubtype::Text,
            2 => RoiSubtype::Arrow,
            3 => RoiSubtype::Ellipse,
            4 => RoiSubtype::Image,
            5 => RoiSubtype::RotatedRect,
            other => RoiSubtype::Other(other),
        }
    }

    /// Header short for this subtype.
    #[must_use]
    pub fn code(self) -> i16 {
        match self {
            RoiSubtype::Undefined => 0,
            RoiSubtype::Text => 1,
            RoiSubtype::Arrow => 2,
            RoiSubtype::Ellipse => 3,
            RoiSubtype::Image => 4,
            RoiSubtype::RotatedRect => 5,
            RoiSubtype::Other(code) => code,
        }
    }
}

impl fmt::Display for RoiSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoiSubtype::Undefined => f.write_str("UNDEFINED"),
            RoiSubtype::Text => f.write_str("TEXT"),
            RoiSubtype::Arrow => f.write_str("ARROW"),
            RoiSubtype::Ellipse => f.write_str("ELLIPSE"),
            RoiSubtype::Image => f.write_str("IMAGE"),
            RoiSubtype::RotatedRect => f.write_str("ROTATED_RECT"),
            RoiSubtype::Other(code) => write!(f, "{code}"),
        }
    }
}

/// Option bit flags at header offset 50.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RoiOptions(pub u16);

impl RoiOptions {
    pub const SPLINE_FIT: u16 = 1;
    pub const DOUBLE_HEADED: u16 = 2;
    pub const OUTLINE: u16 = 4;
    pub const OVERLAY_LABELS: u16 = 8;
    pub const OVERLAY_NAMES: u16 = 16;
    pub const OVERLAY_BACKGROUNDS: u16 = 32;
    pub const OVERLAY_BOLD: u16 = 64;
    pub const SUB_PIXEL_RESOLUTION: u16 = 128;
    pub const DRAW_OFFSET: u16 = 256;
    pub const ZERO_TRANSPARENT: u16 = 512;
    pub const SHOW_LABELS: u16 = 1024;
    pub const SCALE_LABELS: u16 = 2048;
    pub const PROMPT_BEFORE_DELETING: u16 = 4096;
    pub const SCALE_STROKE_WIDTH: u16 = 8192;

    /// Returns true if every bit of `flag` is set.
    #[must_use]
    pub fn contains(self, flag: u16) -> bool {
        self.0 & flag == flag
    }

    /// Sets or clears `flag`.
    pub fn set(&mut self, flag: u16, on: bool) {
        if on {
            self.0 |= flag;
        } else {
            self.0 &= !flag;
        }
    }
}

/// One ImageJ ROI record.
///
/// `x1..y2` double as `xd, yd, widthd, heightd` for sub-pixel rectangles
/// and ovals; both views share the same header bytes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImagejRoi {
    pub byte_order: ByteOrder,
    pub version: u16,
    pub roitype: RoiType,
    pub subtype: RoiSubtype,
    pub options: RoiOptions,
    pub top: i16,
    pub left: i16,
    pub bottom: i16,
    pub right: i16,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub stroke_width: i16,
    pub shape_roi_size: i32,
    pub stroke_color: i32,
    pub fill_color: i32,
    pub arrow_style_or_aspect_ratio: u8,
    pub arrow_head_size: u8,
    pub rounded_rect_arc_size: i16,
    pub position: i32,
    pub c_position: i32,
    pub z_position: i32,
    pub t_position: i32,
    pub name: Option<String>,
    pub overlay_label_color: i32,
    pub overlay_font_size: i16,
    pub group: u8,
    pub image_opacity: u8,
    pub image_size: i32,
    pub float_stroke_width: f32,
    /// `(x, y)` pairs relative to `left, top`.
    pub integer_coordinates: Vec<[i16; 2]>,
    /// Absolute `(x, y)` pairs, present with sub-pixel resolution.
    pub subpixel_coordinates: Option<Vec<[f32; 2]>>,
}

impl Default for ImagejRoi {
    fn default() -> Self {
        Self {
            byte_order: ByteOrder::Big,
            version: VERSION,
            roitype: RoiType::Polygon,
            subtype: RoiSubtype::Undefined,
            options: RoiOptions::default(),
            top: 0,
            left: 0,
            bottom: 0,
            right: 0,
            x1: 0.0,
            y1: 0.0,
            x2: 0.0,
            y2: 0.0,
            stroke_width: 0,
            shape_roi_size: 0,
            stroke_color: 0,
            fill_color: 0,
            arrow_style_or_aspect_ratio: 0,
            arrow_head_size: 0,
            rounded_rect_arc_size: 0,
            position: 0,
            c_position: 0,
            z_position: 0,
            t_position: 0,
            name: None,
            overlay_label_color: 0,
            overlay_font_size: 0,
            group: 0,
            image_opacity: 0,
            image_size: 0,
            float_stroke_width: 0.0,
            integer_coordinates: Vec::new(),
            subpixel_coordinates: None,
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn saturating_i16(value: f64) -> i16 {
    value.clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16
}

impl ImagejRoi {
    /// Creates a record of `roitype` from absolute `(x, y)` vertices.
    ///
    /// Vertices are stored with sub-pixel resolution; integer coordinates
    /// and bounds are derived from them.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_points(points: &[[f64; 2]], roitype: RoiType) -> Self {
        let mut roi = Self {
            roitype,
            ..Self::default()
        };
        if points.is_empty() {
            return roi;
        }
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for &[x, y] in points {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        roi.left = saturating_i16(min_x.floor());
        roi.top = saturating_i16(min_y.floor());
        roi.right = saturating_i16(max_x.ceil());
        roi.bottom = saturating_i16(max_y.ceil());
        let (left, top) = (f64::from(roi.left), f64::from(roi.top));
        roi.integer_coordinates = points
            .iter()
            .map(|&[x, y]| [saturating_i16(x.round() - left), saturating_i16(y.round() - top)])
            .collect();
        roi.subpixel_coordinates = Some(
            points
                .iter()
                .map(|&[x, y]| [x as f32, y as f32])
                .collect(),
        );
        roi.options.set(RoiOptions::SUB_PIXEL_RESOLUTION, true);
        roi
    }

    /// Number of stored vertices.
    #[must_use]
    pub fn n_coordinates(&self) -> usize {
        self.integer_coordinates.len()
    }

    /// Whether the sub-pixel option is set.
    #[must_use]
    pub fn subpixel_resolution(&self) -> bool {
        self.options.contains(RoiOptions::SUB_PIXEL_RESOLUTION)
    }

    /// Whether rectangle/oval bounds should be read from the float fields.
    #[must_use]
    pub fn has_subpixel_rect(&self) -> bool {
        self.subpixel_resolution() && self.version >= 223
    }

    /// Sub-pixel rectangle origin x.
    #[must_use]
    pub fn xd(&self) -> f32 {
        self.x1
    }

    /// Sub-pixel rectangle origin y.
    #[must_use]
    pub fn yd(&self) -> f32 {
        self.y1
    }

    /// Sub-pixel rectangle width.
    #[must_use]
    pub fn widthd(&self) -> f32 {
        self.x2
    }

    /// Sub-pixel rectangle height.
    #[must_use]
    pub fn heightd(&self) -> f32 {
        self.y2
    }

    /// Stores sub-pixel rectangle bounds and sets the sub-pixel option.
    #[allow(clippy::cast_possible_truncation)]
    pub fn set_subpixel_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.x1 = x as f32;
        self.y1 = y as f32;
        self.x2 = width as f32;
        self.y2 = height as f32;
        self.left = saturating_i16(x.round());
        self.top = saturating_i16(y.round());
        self.right = saturating_i16((x + width).round());
        self.bottom = saturating_i16((y + height).round());
        self.options.set(RoiOptions::SUB_PIXEL_RESOLUTION, true);
    }

    /// The three legacy fields holding the packed float parameter.
    #[must_use]
    pub fn float_param_fields(&self) -> (u8, u8, i16) {
        (
            self.arrow_style_or_aspect_ratio,
            self.arrow_head_size,
            self.rounded_rect_arc_size,
        )
    }

    /// Sets the three legacy fields holding the packed float parameter.
    pub fn set_float_param_fields(&mut self, fields: (u8, u8, i16)) {
        (
            self.arrow_style_or_aspect_ratio,
            self.arrow_head_size,
            self.rounded_rect_arc_size,
        ) = fields;
    }

    /// Whether the legacy fields at offset 52 hold a packed float.
    #[must_use]
    pub fn has_float_param(&self) -> bool {
        matches!(self.subtype, RoiSubtype::Ellipse | RoiSubtype::RotatedRect)
    }

    /// Switches the byte order, re-packing a float parameter so its value
    /// is kept.
    pub fn set_byte_order(&mut self, order: ByteOrder) {
        if self.has_float_param() {
            let value = decode_rotated_roi_width(self.float_param_fields(), self.byte_order);
            self.set_float_param_fields(encode_rotated_roi_width(value, order));
        }
        self.byte_order = order;
    }

    /// ImageJ-style label from the bounds centre, `yyyy-xxxx`.
    #[must_use]
    pub fn auto_name(&self) -> String {
        let cy = (i32::from(self.top) + i32::from(self.bottom)) / 2;
        let cx = (i32::from(self.left) + i32::from(self.right)) / 2;
        format!("{cy:04}-{cx:04}")
    }

    /// Parses one record.
    ///
    /// ImageJ writes big-endian records; little-endian ones are recognised
    /// by the version bytes, since every ImageJ version fits in one byte.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRecord`] for a missing magic or unknown type
    /// and [`Error::Truncated`] if a field lies past the end of `data`.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(Error::Truncated {
                offset: 0,
                len: HEADER_SIZE,
            });
        }
        if &data[..4] != MAGIC {
            return Err(Error::InvalidRecord("missing 'Iout' magic".to_string()));
        }
        let byte_order = if data[VERSION_OFFSET] != 0 && data[VERSION_OFFSET + 1] == 0 {
            ByteOrder::Little
        } else {
            ByteOrder::Big
        };
        let r = ByteReader::new(data, byte_order);

        let mut roi = Self {
            byte_order,
            version: r.u16(VERSION_OFFSET)?,
            roitype: RoiType::from_code(r.u8(TYPE)?)?,
            subtype: RoiSubtype::from_code(r.i16(SUBTYPE)?),
            options: RoiOptions(r.u16(OPTIONS)?),
            top: r.i16(TOP)?,
            left: r.i16(LEFT)?,
            bottom: r.i16(BOTTOM)?,
            right: r.i16(RIGHT)?,
            x1: r.f32(X1)?,
            y1: r.f32(Y1)?,
            x2: r.f32(X2)?,
            y2: r.f32(Y2)?,
            stroke_width: r.i16(STROKE_WIDTH)?,
            shape_roi_size: r.i32(SHAPE_ROI_SIZE)?,
            stroke_color: r.i32(STROKE_COLOR)?,
            fill_color: r.i32(FILL_COLOR)?,
            arrow_style_or_aspect_ratio: r.u8(ARROW_STYLE_OR_ASPECT_RATIO)?,
            arrow_head_size: r.u8(ARROW_HEAD_SIZE)?,
            rounded_rect_arc_size: r.i16(ROUNDED_RECT_ARC_SIZE)?,
            position: r.i32(POSITION)?,
            ..Self::default()
        };

        let n = usize::from(r.u16(N_COORDINATES)?);
        // composite shapes reuse the coordinate area for path segments
        if roi.roitype.has_coordinates() && roi.shape_roi_size == 0 && n > 0 {
            roi.read_coordinates(&r, n)?;
        }

        let header2 = usize::try_from(r.i32(HEADER2_OFFSET)?).unwrap_or(0);
        if roi.version >= 218 && header2 > 0 && header2 + HEADER_SIZE <= r.len() {
            roi.read_header2(&r, header2)?;
        }
        Ok(roi)
    }

    fn read_coordinates(&mut self, r: &ByteReader<'_>, n: usize) -> Result<()> {
        let base = HEADER_SIZE;
        self.integer_coordinates = (0..n)
            .map(|i| Ok([r.i16(base + 2 * i)?, r.i16(base + 2 * n + 2 * i)?]))
            .collect::<Result<_>>()?;
        if self.subpixel_resolution() && self.version >= 222 {
            let base = HEADER_SIZE + 4 * n;
            self.subpixel_coordinates = Some(
                (0..n)
                    .map(|i| Ok([r.f32(base + 4 * i)?, r.f32(base + 4 * n + 4 * i)?]))
                    .collect::<Result<_>>()?,
            );
        }
        Ok(())
    }

    fn read_header2(&mut self, r: &ByteReader<'_>, h2: usize) -> Result<()> {
        self.c_position = r.i32(h2 + C_POSITION)?;
        self.z_position = r.i32(h2 + Z_POSITION)?;
        self.t_position = r.i32(h2 + T_POSITION)?;
        self.overlay_label_color = r.i32(h2 + OVERLAY_LABEL_COLOR)?;
        self.overlay_font_size = r.i16(h2 + OVERLAY_FONT_SIZE)?;
        self.group = r.u8(h2 + GROUP)?;
        self.image_opacity = r.u8(h2 + IMAGE_OPACITY)?;
        self.image_size = r.i32(h2 + IMAGE_SIZE)?;
        self.float_stroke_width = r.f32(h2 + FLOAT_STROKE_WIDTH)?;

        let name_offset = usize::try_from(r.i32(h2 + NAME_OFFSET)?).unwrap_or(0);
        let name_length = usize::try_from(r.i32(h2 + NAME_LENGTH)?).unwrap_or(0);
        if name_offset > 0 && name_length > 0 {
            let units = (0..name_length)
                .map(|i| r.u16(name_offset + 2 * i))
                .collect::<Result<Vec<_>>>()?;
            self.name = Some(String::from_utf16_lossy(&units));
        }
        Ok(())
    }

    /// Serializes the record in its byte order.
    ///
    /// Vertex lists are written only for types that carry them; floats are
    /// written when sub-pixel coordinates are present.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRecord`] if the vertex list or name is too
    /// long for the format, or if the sub-pixel list length differs from
    /// the integer list.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let coords: &[[i16; 2]] = if self.roitype.has_coordinates() {
            &self.integer_coordinates
        } else {
            &[]
        };
        let n = coords.len();
        let n_field = u16::try_from(n)
            .map_err(|_| Error::InvalidRecord(format!("{n} vertices exceed the format limit")))?;
        let subpixel = match &self.subpixel_coordinates {
            Some(points) if n > 0 => {
                if points.len() != n {
                    return Err(Error::InvalidRecord(format!(
                        "{} sub-pixel vertices for {n} integer vertices",
                        points.len()
                    )));
                }
                Some(points.as_slice())
            }
            _ => None,
        };

        let coords_len = 4 * n + if subpixel.is_some() { 8 * n } else { 0 };
        let h2 = HEADER_SIZE + coords_len;
        let name_units: Vec<u16> = self
            .name
            .as_deref()
            .map(|name| name.encode_utf16().collect())
            .unwrap_or_default();
        let name_offset = h2 + HEADER_SIZE;
        let to_i32 = |value: usize| {
            i32::try_from(value)
                .map_err(|_| Error::InvalidRecord(format!("offset {value} exceeds the format limit")))
        };

        let mut options = self.options;
        if subpixel.is_some() {
            options.set(RoiOptions::SUB_PIXEL_RESOLUTION, true);
        }

        let mut w = ByteWriter::with_len(name_offset + 2 * name_units.len(), self.byte_order);
        w.put_bytes(0, MAGIC);
        w.put_u16(VERSION_OFFSET, self.version);
        w.put_u8(TYPE, self.roitype.code());
        w.put_i16(TOP, self.top);
        w.put_i16(LEFT, self.left);
        w.put_i16(BOTTOM, self.bottom);
        w.put_i16(RIGHT, self.right);
        w.put_u16(N_COORDINATES, n_field);
        w.put_f32(X1, self.x1);
        w.put_f32(Y1, self.y1);
        w.put_f32(X2, self.x2);
        w.put_f32(Y2, self.y2);
        w.put_i16(STROKE_WIDTH, self.stroke_width);
        w.put_i32(SHAPE_ROI_SIZE, self.shape_roi_size);
        w.put_i32(STROKE_COLOR, self.stroke_color);
        w.put_i32(FILL_COLOR, self.fill_color);
        w.put_i16(SUBTYPE, self.subtype.code());
        w.put_u16(OPTIONS, options.0);
        w.put_u8(ARROW_STYLE_OR_ASPECT_RATIO, self.arrow_style_or_aspect_ratio);
        w.put_u8(ARROW_HEAD_SIZE, self.arrow_head_size);
        w.put_i16(ROUNDED_RECT_ARC_SIZE, self.rounded_rect_arc_size);
        w.put_i32(POSITION, self.position);
        w.put_i32(HEADER2_OFFSET, to_i32(h2)?);

        for (i, &[x, y]) in coords.iter().enumerate() {
            w.put_i16(HEADER_SIZE + 2 * i, x);
            w.put_i16(HEADER_SIZE + 2 * n + 2 * i, y);
        }
        if let Some(points) = subpixel {
            let base = HEADER_SIZE + 4 * n;
            for (i, &[x, y]) in points.iter().enumerate() {
                w.put_f32(base + 4 * i, x);
                w.put_f32(base + 4 * n + 4 * i, y);
            }
        }

        w.put_i32(h2 + C_POSITION, self.c_position);
        w.put_i32(h2 + Z_POSITION, self.z_position);
        w.put_i32(h2 + T_POSITION, self.t_position);
        if !name_units.is_empty() {
            w.put_i32(h2 + NAME_OFFSET, to_i32(name_offset)?);
            w.put_i32(h2 + NAME_LENGTH, to_i32(name_units.len())?);
        }
        w.put_i32(h2 + OVERLAY_LABEL_COLOR, self.overlay_label_color);
        w.put_i16(h2 + OVERLAY_FONT_SIZE, self.overlay_font_size);
        w.put_u8(h2 + GROUP, self.group);
        w.put_u8(h2 + IMAGE_OPACITY, self.image_opacity);
        w.put_i32(h2 + IMAGE_SIZE, self.image_size);
        w.put_f32(h2 + FLOAT_STROKE_WIDTH, self.float_stroke_width);
        for (i, unit) in name_units.iter().enumerate() {
            w.put_u16(name_offset + 2 * i, *unit);
        }
        Ok(w.into_inner())
    }
}
