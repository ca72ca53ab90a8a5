use super::{Template, write_title};
use presto_core::FrontMatter;

/// Lesson plan (教案): title, then a teacher and date line unless the plan is
/// signed at the end.
#[derive(Debug, Clone, Copy, Default)]
pub struct Jiaoan;

impl Template for Jiaoan {
    fn id(&self) -> &'static str {
        "jiaoan"
    }

    fn preamble(&self) -> &'static str {
        include_str!("../../assets/jiaoan/template_head.typ")
    }

    fn keywords(&self) -> &'static str {
        "教案, 教学设计"
    }

    fn manifest(&self) -> &'static str {
        include_str!("../../assets/jiaoan/manifest.json")
    }

    fn example(&self) -> &'static str {
        include_str!("../../assets/jiaoan/example.md")
    }

    fn write_header(&self, out: &mut String, front_matter: &FrontMatter) {
        write_title(out);
        if !front_matter.signature {
            out.push_str("#lesson-info(autoAuthor, autoDate)\n");
        }
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_has_lesson_info_unless_signed() {
        let mut out = String::new();
        Jiaoan.write_header(&mut out, &FrontMatter::default());
        assert!(out.ends_with("#lesson-info(autoAuthor, autoDate)\n\n"), "got: {out}");

        let signed = FrontMatter {
            signature: true,
            ..FrontMatter::default()
        };
        let mut out = String::new();
        Jiaoan.write_header(&mut out, &signed);
        assert!(!out.contains("lesson-info"), "got: {out}");
    }
}
