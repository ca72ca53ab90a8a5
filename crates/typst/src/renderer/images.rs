//! Figure emission for paragraphs made of images.
//!
//! With known sizes the layout is computed here and written as static
//! `image(..)` calls. Otherwise a Typst script is emitted that measures the
//! images at render time and runs the same row packing.

use super::context::Context;
use crate::layout::{
    GAP_CM, ImageGroup, ImageRef, ImageSize, MAX_SIZE_CM, fit_single, layout_rows,
};
use presto_core::{escape_content, escape_string};

const SUBCAPTION_STYLE: &str = "text(font: FONT_FS, size: zh(3))";

/// Emits the figures for one paragraph's images and advances the counter.
pub(super) fn render_images(images: &[ImageRef], ctx: &mut Context) {
    let Some(group) = ImageGroup::classify(images) else {
        return;
    };
    let known = ctx.known_sizes(images);

    let typst = match group {
        ImageGroup::Single => {
            let number = ctx.next_figure();
            single_figure(&images[0], number, known.as_ref().map(|sizes| sizes[0]))
        }
        ImageGroup::Flow => {
            let numbers: Vec<usize> = images.iter().map(|_| ctx.next_figure()).collect();
            match known {
                Some(sizes) => static_flow(images, &numbers, &sizes),
                None => measured_flow(images),
            }
        }
        ImageGroup::Subfigure => {
            let number = ctx.next_figure();
            match known {
                Some(sizes) => static_subfigures(images, number, &sizes),
                None => measured_subfigures(images, number),
            }
        }
    };

    ctx.push_raw(&typst);
}

fn cm(value: f64) -> String {
    format!("{value:.2}cm")
}

fn single_figure(image: &ImageRef, number: usize, known: Option<ImageSize>) -> String {
    let path = escape_string(&image.path);
    let body = match known {
        Some(size) => {
            let fitted = fit_single(size);
            format!(
                "image(\"{path}\", width: {}, height: {})",
                cm(fitted.width),
                cm(fitted.height)
            )
        }
        None => format!(
            "context {{
    let img = image(\"{path}\")
    let img-size = measure(img)
    let x = img-size.width
    let y = img-size.height
    let max-size = {MAX_SIZE_CM}cm

    let new-x = x
    let new-y = y

    if x > max-size {{
      let scale = max-size / x
      new-x = max-size
      new-y = y * scale
    }}

    if new-y > max-size {{
      let scale = max-size / new-y
      new-x = new-x * scale
      new-y = max-size
    }}

    image(\"{path}\", width: new-x, height: new-y)
  }}"
        ),
    };

    format!(
        "#figure(\n  {body},\n  caption: [{}],\n) <fig-{number}>\n",
        escape_content(&image.caption)
    )
}

fn static_flow(images: &[ImageRef], numbers: &[usize], sizes: &[ImageSize]) -> String {
    let ratios: Vec<f64> = sizes.iter().map(ImageSize::ratio).collect();
    let mut out = String::new();

    for row in layout_rows(&ratios, false) {
        out.push_str(&format!(
            "#align(center, grid(\n  columns: {},\n  gutter: {},\n",
            row.images.len(),
            cm(GAP_CM)
        ));
        for i in row.images.clone() {
            out.push_str(&format!(
                "  [#figure(image(\"{}\", width: {}, height: {}), caption: [{}]) <fig-{}>],\n",
                escape_string(&images[i].path),
                cm(row.width_for(ratios[i])),
                cm(row.height),
                escape_content(&images[i].caption),
                numbers[i]
            ));
        }
        out.push_str("))\n#v(0.3em)\n");
    }

    out
}

fn static_subfigures(images: &[ImageRef], number: usize, sizes: &[ImageSize]) -> String {
    let ratios: Vec<f64> = sizes.iter().map(ImageSize::ratio).collect();
    let mut out = String::from("#figure(\n");

    for row in layout_rows(&ratios, true) {
        out.push_str(&format!(
            "  align(center, grid(\n    columns: {},\n    gutter: {},\n",
            row.images.len(),
            cm(GAP_CM)
        ));
        for i in row.images.clone() {
            out.push_str(&format!(
                "    {{\n      v(0.5em)\n      image(\"{}\", width: {}, height: {})\n      align(center, {SUBCAPTION_STYLE}[({}) {}])\n    }},\n",
                escape_string(&images[i].path),
                cm(row.width_for(ratios[i])),
                cm(row.height),
                sub_label(i),
                escape_content(&images[i].caption)
            ));
        }
        out.push_str("  )),\n");
    }

    out.push_str(&format!(
        "  caption: [{}],\n) <fig-{number}>\n",
        escape_content(&images[0].alt)
    ));
    out
}

/// `a`, `b`, … `z`, `aa`, `ab`, … like Typst's `numbering("a", n)`.
fn sub_label(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push((b'a' + (n % 26) as u8) as char);
        n /= 26;
    }
    letters.iter().rev().collect()
}

fn string_array<'a>(items: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::from("(");
    for item in items {
        out.push('"');
        out.push_str(&escape_string(item));
        out.push_str("\", ");
    }
    // trailing comma keeps a one-element array an array
    if out.ends_with(", ") {
        out.truncate(out.len() - 1);
    }
    out.push(')');
    out
}

fn measure_prelude(images: &[ImageRef], indent: &str) -> String {
    let paths = string_array(images.iter().map(|img| img.path.as_str()));
    let captions = string_array(images.iter().map(|img| img.caption.as_str()));
    let script = format!(
        "let paths = {paths}
let captions = {captions}

let gap = {GAP_CM}cm
let max-width = {MAX_SIZE_CM}cm
let min-height = {min}cm

let sizes = paths.zip(captions).map(item => {{
  let size = measure(image(item.at(0)))
  (path: item.at(0), caption: item.at(1), ratio: size.width / size.height)
}})

let calc-row-height(imgs) = {{
  let n = imgs.len()
  let ratio-sum = imgs.map(img => img.ratio).sum()
  (max-width - (n - 1) * gap) / ratio-sum
}}

",
        min = crate::layout::MIN_ROW_HEIGHT_CM,
    );
    indent_lines(&script, indent)
}

const PACK_ROWS: &str = "let rows = ()
let remaining = sizes
while remaining.len() > 0 {
  let end = remaining.len()
  for n in range(2, remaining.len() + 1) {
    if calc-row-height(remaining.slice(0, n)) < min-height {
      end = n - 1
      break
    }
  }
  rows.push(remaining.slice(0, end))
  remaining = remaining.slice(end)
}

";

const FLOW_ROWS: &str = "for row in rows {
  let row-height = calc-row-height(row)
  if row-height > max-width {
    row-height = max-width
  }
  align(center, grid(
    columns: row.len(),
    gutter: gap,
    ..row.map(img => figure(
      image(img.path, width: row-height * img.ratio, height: row-height),
      caption: [#img.caption],
    )),
  ))
  v(0.3em)
}
";

const SUBFIGURE_ROWS: &str = "let rows = (sizes,)
for row in rows {
  let row-height = calc-row-height(row)
  if row-height > max-width {
    row-height = max-width
  }
  align(center, grid(
    columns: row.len(),
    gutter: gap,
    ..row.enumerate().map(item => {
      let i = item.at(0)
      let img = item.at(1)
      let sub-label = numbering(\"a\", i + 1)
      v(0.5em)
      image(img.path, width: row-height * img.ratio, height: row-height)
      align(center, text(font: FONT_FS, size: zh(3))[(#sub-label) #img.caption])
    }),
  ))
}
";

fn measured_flow(images: &[ImageRef]) -> String {
    let mut out = String::from("#context {\n");
    out.push_str(&measure_prelude(images, "  "));
    out.push_str(&indent_lines(PACK_ROWS, "  "));
    out.push_str(&indent_lines(FLOW_ROWS, "  "));
    out.push_str("}\n");
    out
}

fn measured_subfigures(images: &[ImageRef], number: usize) -> String {
    let mut out = String::from("#figure(\n  context {\n");
    out.push_str(&measure_prelude(images, "    "));
    out.push_str(&indent_lines(SUBFIGURE_ROWS, "    "));
    out.push_str(&format!(
        "  }},\n  caption: [{}],\n) <fig-{number}>\n",
        escape_content(&images[0].alt)
    ));
    out
}

fn indent_lines(text: &str, indent: &str) -> String {
    let mut out = String::with_capacity(text.len() + 64);
    for line in text.split_inclusive('\n') {
        if line != "\n" {
            out.push_str(indent);
        }
        out.push_str(line);
    }
    out
}
