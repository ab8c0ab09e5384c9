//! Content chunk extraction.
//!
//! Walks a page content stream with a text and graphics state machine and
//! packages every text-showing operation and image placement as a
//! [`ContentChunk`], in content-stream encounter order.

use std::collections::HashMap;
use std::rc::Rc;

use super::chunk::{ContentChunk, ImageChunk, TextChunk};
use super::font::FontMetrics;
use crate::cos::{
    decode_content, inherited_attribute, page_content_ops, ContentOp, CosDict, CosObject,
    ObjectKey, ObjectSource,
};
use crate::error::Result;
use crate::geometry::Matrix;

/// Default nesting limit for form XObjects.
pub const DEFAULT_MAX_FORM_DEPTH: usize = 8;

/// Kerning adjustment (thousandths of an em) treated as a word break in `TJ`.
const TJ_SPACE_THRESHOLD: f64 = 200.0;

/// Approximate descender and ascender, as fractions of the font size.
const DESCENT: f64 = 0.2;
const ASCENT: f64 = 0.8;

/// Extracts content chunks from the pages of one document.
pub struct ChunkExtractor<'a> {
    source: &'a dyn ObjectSource,
    max_form_depth: usize,
}

impl<'a> ChunkExtractor<'a> {
    pub fn new(source: &'a dyn ObjectSource) -> Self {
        Self {
            source,
            max_form_depth: DEFAULT_MAX_FORM_DEPTH,
        }
    }

    /// Set the nesting limit for form XObjects.
    pub fn with_max_form_depth(mut self, depth: usize) -> Self {
        self.max_form_depth = depth;
        self
    }

    /// Extract the chunks of one page.
    ///
    /// Fails only when the page's own content stream cannot be tokenized;
    /// broken form XObjects are skipped.
    pub fn extract(
        &self,
        page_key: ObjectKey,
        page_number: u32,
        page: &CosDict,
    ) -> Result<Vec<ContentChunk>> {
        let ops = page_content_ops(self.source, page)?;
        let resources = inherited_attribute(self.source, page, "Resources")
            .and_then(|r| r.as_dict().cloned())
            .unwrap_or_default();

        let mut walk = Walk {
            source: self.source,
            page_number,
            max_form_depth: self.max_form_depth,
            forms: Vec::new(),
            chunks: Vec::new(),
        };
        walk.run(&ops, &resources, GraphicsState::new(Matrix::IDENTITY), None, 0);

        log::debug!(
            "Page {} ({} {} R): extracted {} chunks from {} operations",
            page_number,
            page_key.0,
            page_key.1,
            walk.chunks.len(),
            ops.len()
        );
        Ok(walk.chunks)
    }
}

/// Graphics state parameters that survive `q`/`Q`.
#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    fill_color: [f64; 3],
    font: Option<Rc<FontMetrics>>,
    font_size: f64,
    char_spacing: f64,
    word_spacing: f64,
    horizontal_scaling: f64,
    leading: f64,
    rise: f64,
}

impl GraphicsState {
    fn new(ctm: Matrix) -> Self {
        Self {
            ctm,
            fill_color: [0.0, 0.0, 0.0],
            font: None,
            font_size: 12.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scaling: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

/// One piece of a text-showing operation.
enum Segment<'b> {
    Text(&'b [u8]),
    Adjust(f64),
}

struct Walk<'a> {
    source: &'a dyn ObjectSource,
    page_number: u32,
    max_form_depth: usize,
    /// Form XObjects currently being walked, outermost first
    forms: Vec<ObjectKey>,
    chunks: Vec<ContentChunk>,
}

impl Walk<'_> {
    fn run(
        &mut self,
        ops: &[ContentOp],
        resources: &CosDict,
        mut gs: GraphicsState,
        inherited_mcid: Option<i64>,
        depth: usize,
    ) {
        let mut saved: Vec<GraphicsState> = Vec::new();
        let mut text_matrix = Matrix::IDENTITY;
        let mut line_matrix = Matrix::IDENTITY;
        let mut marked: Vec<Option<i64>> = Vec::new();
        let mut fonts: HashMap<String, Rc<FontMetrics>> = HashMap::new();

        for op in ops {
            match op.operator.as_str() {
                "q" => saved.push(gs.clone()),
                "Q" => {
                    if let Some(previous) = saved.pop() {
                        gs = previous;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_slice(&op.numbers()) {
                        gs.ctm = m.multiply(&gs.ctm);
                    }
                }
                "BT" => {
                    text_matrix = Matrix::IDENTITY;
                    line_matrix = Matrix::IDENTITY;
                }
                "Tf" => {
                    if let Some(name) = op.operands.first().and_then(CosObject::as_name) {
                        let font = fonts
                            .entry(name.to_string())
                            .or_insert_with(|| Rc::new(self.font(resources, name)))
                            .clone();
                        gs.font = Some(font);
                    }
                    if let Some(size) = op.number(1) {
                        gs.font_size = size;
                    }
                }
                "Td" | "TD" => {
                    let tx = op.number(0).unwrap_or(0.0);
                    let ty = op.number(1).unwrap_or(0.0);
                    if op.operator == "TD" {
                        gs.leading = -ty;
                    }
                    line_matrix = Matrix::translation(tx, ty).multiply(&line_matrix);
                    text_matrix = line_matrix;
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_slice(&op.numbers()) {
                        line_matrix = m;
                        text_matrix = m;
                    }
                }
                "T*" => {
                    line_matrix = Matrix::translation(0.0, -gs.leading).multiply(&line_matrix);
                    text_matrix = line_matrix;
                }
                "TL" => gs.leading = op.number(0).unwrap_or(gs.leading),
                "Tc" => gs.char_spacing = op.number(0).unwrap_or(gs.char_spacing),
                "Tw" => gs.word_spacing = op.number(0).unwrap_or(gs.word_spacing),
                "Tz" => {
                    gs.horizontal_scaling = op.number(0).map(|s| s / 100.0).unwrap_or(1.0);
                }
                "Ts" => gs.rise = op.number(0).unwrap_or(gs.rise),
                "Tj" => {
                    if let Some(bytes) = op.operands.first().and_then(CosObject::as_bytes) {
                        let mcid = current_mcid(&marked, inherited_mcid);
                        self.show(&gs, &mut text_matrix, &[Segment::Text(bytes)], mcid);
                    }
                }
                "TJ" => {
                    if let Some(items) = op.operands.first().and_then(CosObject::as_array) {
                        let segments: Vec<Segment> = items
                            .iter()
                            .filter_map(|item| match item {
                                CosObject::String(b) => Some(Segment::Text(&b[..])),
                                other => other.as_f64().map(Segment::Adjust),
                            })
                            .collect();
                        let mcid = current_mcid(&marked, inherited_mcid);
                        self.show(&gs, &mut text_matrix, &segments, mcid);
                    }
                }
                "'" | "\"" => {
                    let text_index = if op.operator == "\"" {
                        gs.word_spacing = op.number(0).unwrap_or(gs.word_spacing);
                        gs.char_spacing = op.number(1).unwrap_or(gs.char_spacing);
                        2
                    } else {
                        0
                    };
                    line_matrix = Matrix::translation(0.0, -gs.leading).multiply(&line_matrix);
                    text_matrix = line_matrix;
                    if let Some(bytes) = op.operands.get(text_index).and_then(CosObject::as_bytes) {
                        let mcid = current_mcid(&marked, inherited_mcid);
                        self.show(&gs, &mut text_matrix, &[Segment::Text(bytes)], mcid);
                    }
                }
                "g" | "rg" | "k" | "sc" | "scn" => {
                    if let Some(color) = to_rgb(&op.numbers()) {
                        gs.fill_color = color;
                    }
                }
                "cs" => gs.fill_color = [0.0, 0.0, 0.0],
                "BMC" => marked.push(None),
                "BDC" => marked.push(self.marked_content_id(op, resources)),
                "EMC" => {
                    marked.pop();
                }
                "Do" => {
                    if let Some(name) = op.operands.first().and_then(CosObject::as_name) {
                        let mcid = current_mcid(&marked, inherited_mcid);
                        self.draw_xobject(name, &gs, resources, mcid, depth);
                    }
                }
                _ => {}
            }
        }
    }

    /// Show a string (or `TJ` array), emit one text chunk and advance the
    /// text matrix.
    fn show(
        &mut self,
        gs: &GraphicsState,
        text_matrix: &mut Matrix,
        segments: &[Segment],
        mcid: Option<i64>,
    ) {
        let fallback;
        let font: &FontMetrics = match &gs.font {
            Some(f) => f,
            None => {
                fallback = FontMetrics::fallback("");
                &fallback
            }
        };
        let size = gs.font_size;
        let scale = gs.horizontal_scaling;

        let mut text = String::new();
        let mut advance = 0.0;
        for segment in segments {
            match segment {
                Segment::Text(bytes) => {
                    for code in font.codes(bytes) {
                        let mut width = font.width(code) / 1000.0 * size + gs.char_spacing;
                        if font.code_length == 1 && code == 32 {
                            width += gs.word_spacing;
                        }
                        advance += width * scale;
                    }
                    text.push_str(&self.source.decode_text(font.object_key, bytes));
                }
                Segment::Adjust(amount) => {
                    advance -= amount / 1000.0 * size * scale;
                    if -amount > TJ_SPACE_THRESHOLD
                        && !text.is_empty()
                        && !text.ends_with(' ')
                        && !text.ends_with('\u{00A0}')
                        && !text.chars().last().is_some_and(is_spaceless_script_char)
                    {
                        text.push(' ');
                    }
                }
            }
        }

        let to_page = text_matrix.multiply(&gs.ctm);
        if !text.is_empty() {
            let bounding_box = to_page.transform_rect(
                self.page_number,
                0.0,
                gs.rise - DESCENT * size,
                advance,
                gs.rise + ASCENT * size,
            );
            let vertical_scale = (to_page.c * to_page.c + to_page.d * to_page.d).sqrt();
            self.chunks.push(ContentChunk::Text(TextChunk {
                value: text,
                bounding_box,
                font_name: font.base_font.clone(),
                font_size: size * vertical_scale,
                fill_color: gs.fill_color,
                mcid,
            }));
        }
        *text_matrix = Matrix::translation(advance, 0.0).multiply(text_matrix);
    }

    fn draw_xobject(
        &mut self,
        name: &str,
        gs: &GraphicsState,
        resources: &CosDict,
        mcid: Option<i64>,
        depth: usize,
    ) {
        let Some(entry) = self
            .source
            .get_resolved(resources, "XObject")
            .and_then(|x| x.as_dict().and_then(|d| d.get(name).cloned()))
        else {
            log::debug!("XObject /{} not found in resources", name);
            return;
        };
        let form_key = entry.as_reference();
        let xobject = self.source.resolve(&entry);
        let Some(stream) = xobject.as_stream() else {
            return;
        };

        match stream.dict.get_name("Subtype") {
            Some("Image") => {
                let bounding_box = gs.ctm.transform_rect(self.page_number, 0.0, 0.0, 1.0, 1.0);
                self.chunks
                    .push(ContentChunk::Image(ImageChunk { bounding_box, mcid }));
            }
            Some("Form") => {
                if depth >= self.max_form_depth {
                    log::warn!("Form XObject /{} exceeds nesting limit, skipped", name);
                    return;
                }
                if let Some(key) = form_key.filter(|k| self.forms.contains(k)) {
                    log::warn!("Form XObject cycle at {} {} R, skipped", key.0, key.1);
                    return;
                }
                let ops = match decode_content(&stream.data) {
                    Ok(ops) => ops,
                    Err(e) => {
                        log::warn!("Failed to decode form XObject /{}: {}", name, e);
                        return;
                    }
                };
                let matrix = stream
                    .dict
                    .get("Matrix")
                    .and_then(CosObject::as_number_array)
                    .and_then(|m| Matrix::from_slice(&m))
                    .unwrap_or_default();
                let form_resources = self
                    .source
                    .get_resolved(&stream.dict, "Resources")
                    .and_then(|r| r.as_dict().cloned())
                    .unwrap_or_else(|| resources.clone());
                let mut form_state = gs.clone();
                form_state.ctm = matrix.multiply(&gs.ctm);
                self.forms.extend(form_key);
                self.run(&ops, &form_resources, form_state, mcid, depth + 1);
                if form_key.is_some() {
                    self.forms.pop();
                }
            }
            _ => {}
        }
    }

    fn font(&self, resources: &CosDict, name: &str) -> FontMetrics {
        self.source
            .get_resolved(resources, "Font")
            .and_then(|fonts| fonts.as_dict().and_then(|d| d.get(name).cloned()))
            .and_then(|entry| {
                let font = self.source.resolve_dict(&entry)?;
                let mut metrics = FontMetrics::from_dict(self.source, name, &font);
                metrics.object_key = entry.as_reference();
                Some(metrics)
            })
            .unwrap_or_else(|| {
                log::debug!("Font /{} not found in resources", name);
                FontMetrics::fallback(name)
            })
    }

    /// MCID of a `BDC` property list, given inline or by `/Properties` name.
    fn marked_content_id(&self, op: &ContentOp, resources: &CosDict) -> Option<i64> {
        let properties = match op.operands.get(1)? {
            CosObject::Dictionary(d) => d.clone(),
            CosObject::Name(name) => self
                .source
                .get_resolved(resources, "Properties")
                .and_then(|p| p.as_dict().and_then(|d| d.get(name).cloned()))
                .and_then(|p| self.source.resolve_dict(&p))?,
            _ => return None,
        };
        properties.get("MCID").and_then(CosObject::as_i64)
    }
}

fn current_mcid(marked: &[Option<i64>], inherited: Option<i64>) -> Option<i64> {
    marked.iter().rev().find_map(|m| *m).or(inherited)
}

/// Convert gray, RGB or CMYK components to RGB.
fn to_rgb(components: &[f64]) -> Option<[f64; 3]> {
    let clamp = |v: f64| v.clamp(0.0, 1.0);
    match components {
        [g] => Some([clamp(*g); 3]),
        [r, g, b] => Some([clamp(*r), clamp(*g), clamp(*b)]),
        [c, m, y, k] => Some([
            clamp((1.0 - c) * (1.0 - k)),
            clamp((1.0 - m) * (1.0 - k)),
            clamp((1.0 - y) * (1.0 - k)),
        ]),
        _ => None,
    }
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and Extension A
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    // CJK Unified Ideographs Extension B-F
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana and Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cos::MemorySource;

    fn page_with(content: &[u8], resources: Option<CosDict>) -> (MemorySource, ObjectKey) {
        let mut source = MemorySource::new();
        let mut entries = CosDict::new();
        if let Some(resources) = resources {
            entries = entries.with("Resources", resources);
        }
        let key = source.add_page(entries, content);
        (source, key)
    }

    fn extract(source: &MemorySource, key: ObjectKey) -> Vec<ContentChunk> {
        let page = source.object(key).and_then(|p| p.as_dict().cloned()).unwrap();
        ChunkExtractor::new(source).extract(key, 1, &page).unwrap()
    }

    fn texts(chunks: &[ContentChunk]) -> Vec<&str> {
        chunks
            .iter()
            .filter_map(|c| c.as_text().map(|t| t.value.as_str()))
            .collect()
    }

    #[test]
    fn test_chunks_in_encounter_order() {
        let (source, key) = page_with(
            b"BT /F1 12 Tf 300 700 Td (World) Tj -200 0 Td (Hello) Tj ET",
            None,
        );
        let chunks = extract(&source, key);
        assert_eq!(texts(&chunks), vec!["World", "Hello"]);
    }

    #[test]
    fn test_text_bounding_box() {
        let (source, key) = page_with(b"BT /F1 10 Tf 100 700 Td (Hi) Tj ET", None);
        let chunks = extract(&source, key);
        let bbox = chunks[0].bounding_box();

        // Two glyphs of the 500/1000 em fallback width at 10pt
        assert!((bbox.left - 100.0).abs() < 1e-9);
        assert!((bbox.right - 110.0).abs() < 1e-9);
        assert!((bbox.bottom - 698.0).abs() < 1e-9);
        assert!((bbox.top - 708.0).abs() < 1e-9);
        assert_eq!(bbox.page_number, 1);
    }

    #[test]
    fn test_text_matrix_advances_between_shows() {
        let (source, key) = page_with(b"BT /F1 10 Tf 100 700 Td (ab) Tj (cd) Tj ET", None);
        let chunks = extract(&source, key);
        assert!((chunks[1].bounding_box().left - 110.0).abs() < 1e-9);
    }

    #[test]
    fn test_tj_array_inserts_word_space() {
        let (source, key) = page_with(b"BT /F1 12 Tf 0 0 Td [(Hello) -300 (World)] TJ ET", None);
        let chunks = extract(&source, key);
        assert_eq!(texts(&chunks), vec!["Hello World"]);
    }

    #[test]
    fn test_cm_and_fill_color() {
        let (source, key) = page_with(
            b"q 1 0 0 1 50 50 cm 1 0 0 rg BT /F1 10 Tf 0 0 Td (X) Tj ET Q",
            None,
        );
        let chunks = extract(&source, key);
        let text = chunks[0].as_text().unwrap();
        assert!((text.bounding_box.left - 50.0).abs() < 1e-9);
        assert_eq!(text.fill_color, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_marked_content_ids() {
        let (source, key) = page_with(
            b"/P <</MCID 3>> BDC BT /F1 12 Tf (In) Tj ET EMC BT (Out) Tj ET",
            None,
        );
        let chunks = extract(&source, key);
        assert_eq!(chunks[0].mcid(), Some(3));
        assert_eq!(chunks[1].mcid(), None);
    }

    #[test]
    fn test_font_widths_from_resources() {
        let font: CosDict = [
            ("Type", CosObject::name("Font")),
            ("Subtype", CosObject::name("Type1")),
            ("BaseFont", CosObject::name("Courier")),
            ("FirstChar", CosObject::Integer(32)),
            ("Widths", CosObject::numbers(&[600.0; 95])),
        ]
        .into_iter()
        .collect();
        let resources = CosDict::new().with("Font", CosDict::new().with("F1", font));
        let (source, key) = page_with(b"BT /F1 10 Tf 0 0 Td (abc) Tj ET", Some(resources));

        let chunks = extract(&source, key);
        let text = chunks[0].as_text().unwrap();
        assert_eq!(text.font_name, "Courier");
        assert!((text.bounding_box.right - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_image_and_form_xobjects() {
        let image = CosObject::stream(
            CosDict::new().with("Subtype", CosObject::name("Image")),
            b"",
        );
        let form = CosObject::stream(
            CosDict::new()
                .with("Subtype", CosObject::name("Form"))
                .with("Matrix", CosObject::numbers(&[1.0, 0.0, 0.0, 1.0, 10.0, 0.0])),
            b"BT /F1 10 Tf 0 0 Td (Inside) Tj ET",
        );
        let mut source = MemorySource::new();
        let image_key = source.add(image);
        let form_key = source.add(form);
        let resources = CosDict::new().with(
            "XObject",
            CosDict::new()
                .with("Im1", CosObject::Reference(image_key))
                .with("Fm1", CosObject::Reference(form_key)),
        );
        let key = source.add_page(
            CosDict::new().with("Resources", resources),
            b"q 100 0 0 50 20 30 cm /Im1 Do Q /Fm1 Do",
        );

        let chunks = extract(&source, key);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].bounding_box().to_rect(), [20.0, 30.0, 120.0, 80.0]);
        let inside = chunks[1].as_text().unwrap();
        assert_eq!(inside.value, "Inside");
        assert!((inside.bounding_box.left - 10.0).abs() < 1e-9);
    }

    fn form(content: &[u8], resources: Option<CosDict>) -> CosObject {
        let mut dict = CosDict::new().with("Subtype", CosObject::name("Form"));
        if let Some(resources) = resources {
            dict = dict.with("Resources", resources);
        }
        CosObject::stream(dict, content)
    }

    #[test]
    fn test_self_referencing_form_is_walked_once() {
        let mut source = MemorySource::new();
        let form_key = source.reserve();
        let resources =
            CosDict::new().with("XObject", CosDict::new().with("X", CosObject::Reference(form_key)));
        let repeat = b"BT /F1 10 Tf (A) Tj ET /X Do /X Do /X Do /X Do /X Do /X Do /X Do /X Do";
        source.insert(form_key, form(repeat, Some(resources.clone())));
        let key = source.add_page(CosDict::new().with("Resources", resources), b"/X Do");

        let chunks = extract(&source, key);
        assert_eq!(texts(&chunks), vec!["A"]);
    }

    #[test]
    fn test_mutually_recursive_forms() {
        let mut source = MemorySource::new();
        let a = source.reserve();
        let b = source.reserve();
        let resources = CosDict::new().with(
            "XObject",
            CosDict::new()
                .with("A", CosObject::Reference(a))
                .with("B", CosObject::Reference(b)),
        );
        source.insert(a, form(b"BT (a) Tj ET /B Do /B Do", Some(resources.clone())));
        source.insert(b, form(b"BT (b) Tj ET /A Do /A Do", Some(resources.clone())));
        let key = source.add_page(CosDict::new().with("Resources", resources), b"/A Do");

        let chunks = extract(&source, key);
        assert_eq!(texts(&chunks), vec!["a", "b", "b"]);
    }

    #[test]
    fn test_form_depth_limit() {
        let mut source = MemorySource::new();
        let mut inner: Option<ObjectKey> = None;
        for level in (0..5).rev() {
            let content = format!("BT ({}) Tj ET /N Do", level);
            let resources = inner.map(|key| {
                CosDict::new().with("XObject", CosDict::new().with("N", CosObject::Reference(key)))
            });
            let resources = resources.unwrap_or_default();
            inner = Some(source.add(form(content.as_bytes(), Some(resources))));
        }
        let resources = CosDict::new().with(
            "XObject",
            CosDict::new().with("N", CosObject::Reference(inner.unwrap())),
        );
        let key = source.add_page(CosDict::new().with("Resources", resources), b"/N Do");
        let page = source.object(key).and_then(|p| p.as_dict().cloned()).unwrap();

        let all = ChunkExtractor::new(&source).extract(key, 1, &page).unwrap();
        assert_eq!(texts(&all), vec!["0", "1", "2", "3", "4"]);

        let limited = ChunkExtractor::new(&source)
            .with_max_form_depth(2)
            .extract(key, 1, &page)
            .unwrap();
        assert_eq!(texts(&limited), vec!["0", "1"]);
    }

    #[test]
    fn test_form_inherits_graphics_state() {
        let mut source = MemorySource::new();
        let form_key = source.add(form(b"BT 0 0 Td (A) Tj ET", None));
        let resources =
            CosDict::new().with("XObject", CosDict::new().with("X", CosObject::Reference(form_key)));
        let key = source.add_page(
            CosDict::new().with("Resources", resources),
            b"1 0 0 rg BT /F1 20 Tf 0 0 Td (B) Tj ET /X Do",
        );

        let chunks = extract(&source, key);
        let drawn = chunks[1].as_text().unwrap();
        assert_eq!(drawn.value, "A");
        assert_eq!(drawn.fill_color, [1.0, 0.0, 0.0]);
        assert!((drawn.font_size - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_form_uses_its_own_fonts() {
        let courier: CosDict = [
            ("Subtype", CosObject::name("Type1")),
            ("BaseFont", CosObject::name("Courier")),
        ]
        .into_iter()
        .collect();
        let helvetica: CosDict = [
            ("Subtype", CosObject::name("Type1")),
            ("BaseFont", CosObject::name("Helvetica")),
        ]
        .into_iter()
        .collect();
        let mut source = MemorySource::new();
        let form_key = source.add(form(
            b"BT /F1 10 Tf (A) Tj ET",
            Some(CosDict::new().with("Font", CosDict::new().with("F1", courier))),
        ));
        let resources = CosDict::new()
            .with("Font", CosDict::new().with("F1", helvetica))
            .with("XObject", CosDict::new().with("X", CosObject::Reference(form_key)));
        let key = source.add_page(
            CosDict::new().with("Resources", resources),
            b"BT /F1 10 Tf (B) Tj ET /X Do",
        );

        let chunks = extract(&source, key);
        assert_eq!(chunks[0].as_text().unwrap().font_name, "Helvetica");
        assert_eq!(chunks[1].as_text().unwrap().font_name, "Courier");
    }

    #[test]
    fn test_invalid_contents_is_an_error() {
        let mut source = MemorySource::new();
        let key = source.add_page(CosDict::new(), b"");
        let page = source
            .object(key)
            .and_then(|p| p.as_dict().cloned())
            .unwrap()
            .with("Contents", CosObject::Integer(7));
        assert!(ChunkExtractor::new(&source).extract(key, 1, &page).is_err());
    }

    #[test]
    fn test_to_rgb() {
        assert_eq!(to_rgb(&[0.5]), Some([0.5, 0.5, 0.5]));
        assert_eq!(to_rgb(&[0.0, 0.0, 0.0, 1.0]), Some([0.0, 0.0, 0.0]));
        assert_eq!(to_rgb(&[1.0, 2.0]), None);
    }
}
