use super::{Template, write_title};
use presto_core::FrontMatter;

/// Official document (公文): title, then an author line unless the document
/// is signed at the end.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gongwen;

impl Template for Gongwen {
    fn id(&self) -> &'static str {
        "gongwen"
    }

    fn preamble(&self) -> &'static str {
        include_str!("../../assets/gongwen/template_head.typ")
    }

    fn keywords(&self) -> &'static str {
        "工作总结, 年终报告"
    }

    fn manifest(&self) -> &'static str {
        include_str!("../../assets/gongwen/manifest.json")
    }

    fn example(&self) -> &'static str {
        include_str!("../../assets/gongwen/example.md")
    }

    fn write_header(&self, out: &mut String, front_matter: &FrontMatter) {
        write_title(out);
        if !front_matter.signature {
            out.push_str("#name(autoAuthor)\n");
        }
        out.push('\n');
    }
}
