//! Page geometry: bounding boxes, transformation matrices and crop-box tests.

use serde::{Deserialize, Serialize};

/// US Letter media box used when a page declares none.
pub const DEFAULT_PAGE_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// A rectangle on a page, in default user space.
///
/// Always normalized: `left <= right` and `bottom <= top`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Page number (1-indexed)
    pub page_number: u32,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
}

impl BoundingBox {
    /// Create a box from two corners in any order.
    pub fn new(page_number: u32, x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            page_number,
            left: x0.min(x1),
            bottom: y0.min(y1),
            right: x0.max(x1),
            top: y0.max(y1),
        }
    }

    /// Create a box from a PDF rectangle array. Needs at least 4 numbers.
    pub fn from_rect(page_number: u32, rect: &[f64]) -> Option<Self> {
        match rect {
            [x0, y0, x1, y1, ..] => Some(Self::new(page_number, *x0, *y0, *x1, *y1)),
            _ => None,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    /// Whether the two boxes share a region of non-zero area on the same page.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.page_number == other.page_number
            && self.left < other.right
            && other.left < self.right
            && self.bottom < other.top
            && other.bottom < self.top
    }

    /// Smallest box containing both. Page number of `self` is kept.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            page_number: self.page_number,
            left: self.left.min(other.left),
            bottom: self.bottom.min(other.bottom),
            right: self.right.max(other.right),
            top: self.top.max(other.top),
        }
    }

    /// The box as a PDF rectangle array.
    pub fn to_rect(&self) -> [f64; 4] {
        [self.left, self.bottom, self.right, self.top]
    }
}

/// Whether `rect` lies entirely outside `crop_box` on some axis.
///
/// Both arrays are `[x0, y0, x1, y1]`. Returns `None` when either has fewer
/// than four coordinates.
pub fn escapes_crop_box(crop_box: &[f64], rect: &[f64]) -> Option<bool> {
    if crop_box.len() < 4 || rect.len() < 4 {
        return None;
    }
    Some(
        crop_box[1] >= rect[3]
            || crop_box[0] >= rect[2]
            || crop_box[3] <= rect[1]
            || crop_box[2] <= rect[0],
    )
}

/// An affine transformation matrix `[a b c d e f]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Build from six numbers; `None` when fewer are given.
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            [a, b, c, d, e, f, ..] => Some(Self::new(*a, *b, *c, *d, *e, *f)),
            _ => None,
        }
    }

    pub fn translation(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// `self × other`: apply `self` first, then `other`.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    pub fn transform(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }

    /// Bounding box of the rectangle `(x0, y0)-(x1, y1)` after transformation.
    pub fn transform_rect(&self, page_number: u32, x0: f64, y0: f64, x1: f64, y1: f64) -> BoundingBox {
        let corners = [
            self.transform(x0, y0),
            self.transform(x1, y0),
            self.transform(x0, y1),
            self.transform(x1, y1),
        ];
        let (mut left, mut bottom) = corners[0];
        let (mut right, mut top) = corners[0];
        for (x, y) in &corners[1..] {
            left = left.min(*x);
            right = right.max(*x);
            bottom = bottom.min(*y);
            top = top.max(*y);
        }
        BoundingBox {
            page_number,
            left,
            bottom,
            right,
            top,
        }
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}
