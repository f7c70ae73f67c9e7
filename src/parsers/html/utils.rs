use super::predicate::Predicate;

/// Media types treated as plain JavaScript
pub const JS_MEDIA_TYPES: &[&str] = &[
    "text/javascript",
    "application/javascript",
    "text/ecmascript",
    "application/ecmascript",
];

/// Media types treated as CSS
pub const CSS_MEDIA_TYPES: &[&str] = &["text/css"];

/// Attributes whose values are rewritten when a document moves
pub const URL_ATTRS: &[&str] = &["href", "src", "action", "style"];

/// Tag name of a custom-element definition
pub const POLYMER_ELEMENT: &str = "polymer-element";

/// ASCII 空白字符
pub const WHITESPACES: &[char] = &[' ', '\t', '\n', '\x0c', '\r'];

/// Elements whose whitespace is significant
pub const WHITESPACE_SENSITIVE: &[&str] = &["pre", "textarea", "script", "style"];

/// `:not([type])` or one of the JavaScript media types
pub fn has_js_type() -> Predicate {
    Predicate::or([
        !Predicate::has_attr("type"),
        Predicate::attr_value_in("type", JS_MEDIA_TYPES.iter().copied()),
    ])
}

/// `link[rel="import"][href]`
pub fn is_import() -> Predicate {
    Predicate::and([
        Predicate::tag("link"),
        Predicate::attr_value("rel", "import"),
        Predicate::has_attr("href"),
    ])
}

/// `link[rel="stylesheet"][href]`
pub fn is_stylesheet() -> Predicate {
    Predicate::and([
        Predicate::tag("link"),
        Predicate::attr_value("rel", "stylesheet"),
        Predicate::has_attr("href"),
    ])
}

/// `<style>` with no type or a CSS type
pub fn is_style_block() -> Predicate {
    Predicate::and([
        Predicate::tag("style"),
        Predicate::or([
            !Predicate::has_attr("type"),
            Predicate::attr_value_in("type", CSS_MEDIA_TYPES.iter().copied()),
        ]),
    ])
}

/// JavaScript `<script>` referencing an external file
pub fn is_external_script() -> Predicate {
    Predicate::and([
        Predicate::tag("script"),
        Predicate::has_attr("src"),
        has_js_type(),
    ])
}

/// JavaScript `<script>` carrying its code inline
pub fn is_inline_script() -> Predicate {
    Predicate::and([
        Predicate::tag("script"),
        !Predicate::has_attr("src"),
        has_js_type(),
    ])
}

pub fn is_polymer_element() -> Predicate {
    Predicate::tag(POLYMER_ELEMENT)
}

pub fn is_polymer_element_missing_assetpath() -> Predicate {
    Predicate::and([is_polymer_element(), !Predicate::has_attr("assetpath")])
}
