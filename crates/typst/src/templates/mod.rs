//! Document templates: preamble, header and footer around the body.

mod gongwen;
mod jiaoan;

pub use gongwen::Gongwen;
pub use jiaoan::Jiaoan;

use presto_core::FrontMatter;

/// A document template.
///
/// The preamble is emitted verbatim before the metadata bindings
/// (`autoTitle`, `autoAuthor`, `autoDate`); header and footer code may refer
/// to those bindings and to anything the preamble defines.
pub trait Template: Send + Sync {
    /// Stable identifier, also the binary name.
    fn id(&self) -> &'static str;

    /// Typst preamble: fonts, page setup, helper functions.
    fn preamble(&self) -> &'static str;

    /// Value of the document `keywords` metadata.
    fn keywords(&self) -> &'static str;

    /// Manifest JSON describing the template.
    fn manifest(&self) -> &'static str;

    /// Example Markdown input.
    fn example(&self) -> &'static str;

    /// Writes everything between the document metadata and the body.
    fn write_header(&self, out: &mut String, front_matter: &FrontMatter);

    /// Writes everything after the body.
    fn write_footer(&self, out: &mut String, front_matter: &FrontMatter) {
        if front_matter.signature {
            write_signature(out);
        }
    }
}

/// Identifiers of the built-in templates.
pub const TEMPLATE_IDS: [&str; 2] = ["gongwen", "jiaoan"];

/// Looks up a built-in template.
pub fn template_by_id(id: &str) -> Option<&'static dyn Template> {
    match id {
        "gongwen" => Some(&Gongwen),
        "jiaoan" => Some(&Jiaoan),
        _ => None,
    }
}

/// Title heading; `|` in the title splits it into lines.
pub(crate) fn write_title(out: &mut String) {
    out.push_str("= #autoTitle.split(\"|\").map(s => s.trim()).join(linebreak())\n\n");
}

/// Right-aligned author and date block.
///
/// `autoDate` is a `datetime` only for ISO dates; free text is printed as is.
pub(crate) fn write_signature(out: &mut String) {
    out.push_str(
        r#"
#v(18pt)
#align(right, block[
  #set align(center)
  #autoAuthor \
  #if type(autoDate) == datetime {
    autoDate.display(
      "[year]年[month padding:none]月[day padding:none]日",
    )
  } else {
    autoDate
  }
])
"#,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_templates_by_id() {
        for id in TEMPLATE_IDS {
            let template = template_by_id(id).expect("built-in template");
            assert_eq!(template.id(), id);
        }
        assert!(template_by_id("memo").is_none());
    }

    #[test]
    fn manifests_are_json_with_version() {
        for id in TEMPLATE_IDS {
            let template = template_by_id(id).unwrap();
            let manifest: serde_json::Value = serde_json::from_str(template.manifest()).unwrap();
            assert_eq!(manifest["name"], id);
            assert!(manifest["version"].is_string(), "{id}: {manifest}");
        }
    }

    #[test]
    fn preambles_define_shared_helpers() {
        for id in TEMPLATE_IDS {
            let preamble = template_by_id(id).unwrap().preamble();
            assert!(preamble.contains("#let FONT_FS"), "{id}");
            assert!(preamble.contains("#let zh("), "{id}");
        }
    }

    #[test]
    fn footer_only_with_signature() {
        let mut out = String::new();
        let mut fm = FrontMatter::default();
        Gongwen.write_footer(&mut out, &fm);
        assert!(out.is_empty());

        fm.signature = true;
        Gongwen.write_footer(&mut out, &fm);
        assert!(out.starts_with("\n#v(18pt)\n#align(right, block["), "got: {out}");
    }
}
