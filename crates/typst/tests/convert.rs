use presto_typst::{
    Gongwen, ImageSize, Jiaoan, Options, TEMPLATE_IDS, Template, convert, convert_with_options,
    render_body, template_by_id,
};

/// Body text between the header and the footer of a gongwen document.
fn body_of(output: &str) -> &str {
    let start = output
        .find("#name(autoAuthor)\n\n")
        .map(|i| i + "#name(autoAuthor)\n\n".len())
        .expect("author line present");
    &output[start..]
}

#[test]
fn converts_minimal_document() {
    let out = convert(&Gongwen, "---\ntitle: 测试\nauthor: 王五\n---\n\n你好,世界?\n");
    assert!(out.contains("#let autoTitle = \"测试\"\n"), "got: {out}");
    assert!(out.contains("#let autoAuthor = \"王五\"\n"), "got: {out}");

    let body = body_of(&out);
    assert_eq!(body, "你好，世界？\n\n");
    assert!(!body.contains(',') && !body.contains('?'));
}

#[test]
fn author_list_is_joined() {
    let out = convert(&Gongwen, "---\nauthor: [张三, 李四]\n---\n正文\n");
    assert!(out.contains("#let autoAuthor = \"张三、李四\""), "got: {out}");
}

#[test]
fn crlf_input_is_normalized() {
    let out = convert(&Gongwen, "---\r\ntitle: 标题\r\n---\r\n\r\n第一行\r\n第二行\r\n");
    assert!(out.contains("#let autoTitle = \"标题\""), "got: {out}");
    assert!(body_of(&out).starts_with("第一行\n第二行"), "got: {out}");
    assert!(!out.contains('\r'));
}

#[test]
fn malformed_front_matter_keeps_body() {
    let out = convert(&Gongwen, "---\ntitle: [unclosed\n---\n\n正文\n");
    assert!(out.contains("#let autoTitle = \"请输入文字\""), "got: {out}");
    assert_eq!(body_of(&out), "正文\n\n");
}

#[test]
fn unterminated_front_matter_is_body() {
    let out = convert(&Gongwen, "---\ntitle: x\n\n正文\n");
    assert!(out.contains("#let autoTitle = \"请输入文字\""), "got: {out}");
    // the stray delimiter renders as a rule, the rest as text
    assert!(body_of(&out).contains("#line(length: 100%)"), "got: {out}");
    assert!(body_of(&out).contains("正文"), "got: {out}");
}

#[test]
fn signature_moves_author_to_footer() {
    let out = convert(
        &Gongwen,
        "---\nauthor: 办公室\ndate: 2024-12-31\nsignature: yes\n---\n\n正文\n",
    );
    assert!(!out.contains("#name(autoAuthor)"), "got: {out}");
    assert!(out.contains("#let autoDate = datetime(\n  year: 2024,\n  month: 12,\n  day: 31,\n)"));
    assert!(out.trim_end().ends_with("])"), "got: {out}");
}

#[test]
fn signature_with_free_text_date_does_not_call_display() {
    let out = convert(
        &Gongwen,
        "---\nauthor: 办公室\ndate: 二〇二四年十二月\nsignature: true\n---\n\n正文\n",
    );
    assert!(out.contains("#let autoDate = \"二〇二四年十二月\"\n"), "got: {out}");
    let footer = &out[out.find("#v(18pt)").expect("signature block")..];
    assert!(!footer.contains("#autoDate.display("), "got: {footer}");
    assert!(
        footer.contains("#if type(autoDate) == datetime {\n    autoDate.display("),
        "got: {footer}"
    );
    assert!(footer.contains("} else {\n    autoDate\n  }"), "got: {footer}");
}

#[test]
fn control_characters_in_metadata_are_escaped() {
    let out = convert(
        &Gongwen,
        "---\ntitle: 'a\" + panic() + \"b'\nauthor: \"x\\\\\"\n---\n\n正文\n",
    );
    assert!(out.contains(r#"#let autoTitle = "a\" + panic() + \"b""#), "got: {out}");
    assert!(out.contains(r#"#let autoAuthor = "x\\""#), "got: {out}");
}

#[test]
fn markup_in_body_is_escaped() {
    let out = convert(&Gongwen, "正文 #import \"x.typ\": * 与 ]结束\n");
    let body = body_of(&out);
    assert!(body.contains("\\#import"), "got: {body}");
    assert!(body.contains("\\*"), "got: {body}");
    assert!(body.contains("\\]结束"), "got: {body}");
}

#[test]
fn figure_numbering_restarts_per_document() {
    let input = "![](a.png)\n\n![](b.png)\n";
    let first = convert(&Gongwen, input);
    let second = convert(&Gongwen, input);
    assert_eq!(first, second);
    assert!(first.contains("<fig-2>"), "got: {first}");
    assert!(!first.contains("<fig-3>"), "got: {first}");
}

#[test]
fn subfigure_group_counts_once() {
    let body = "![总图](a.png) ![](b.png) ![](c.png)\n\n![](d.png)\n";
    let result = render_body(body, &Options::default()).unwrap();
    assert_eq!(result.figure_count, 2);
    assert!(result.typst.contains("<fig-1>"), "got: {}", result.typst);
    assert!(result.typst.contains("<fig-2>"), "got: {}", result.typst);
}

#[test]
fn precomputed_layout_uses_static_sizes() {
    let mut options = Options::default();
    options
        .image_sizes
        .insert("big.png".to_string(), ImageSize::new(30.0, 20.0));
    let out = convert_with_options(&Gongwen, "![](big.png)\n", &options);
    assert!(
        out.contains("image(\"big.png\", width: 13.40cm, height: 8.93cm)"),
        "got: {out}"
    );
}

#[test]
fn noindent_fence_in_code_block_is_literal() {
    let out = convert(&Gongwen, "```md\n::: {.noindent}\n:::\n```\n");
    assert!(body_of(&out).starts_with("```md\n::: {.noindent}\n:::\n```\n"), "got: {out}");
    assert!(!out.contains("noindent-start"), "got: {out}");
}

#[test]
fn jiaoan_has_lesson_info() {
    let out = convert(&Jiaoan, "---\ntitle: 课题\nauthor: 王老师\n---\n\n## 教学目标\n");
    assert!(out.contains("#lesson-info(autoAuthor, autoDate)\n"), "got: {out}");
    assert!(out.contains("keywords: \"教案, 教学设计\""), "got: {out}");
    assert!(out.ends_with("== 教学目标\n\n"), "got: {out}");
}

#[test]
fn examples_convert_cleanly() {
    for id in TEMPLATE_IDS {
        let template: &dyn Template = template_by_id(id).unwrap();
        let out = convert(template, template.example());
        assert!(out.starts_with(template.preamble()), "{id}");
        assert!(!out.contains("请输入文字"), "{id}: example should fill the metadata");
        assert!(out.contains("<fig-1>"), "{id}: got {out}");
    }
}
