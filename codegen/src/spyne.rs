//! Python output for the Spyne RPC framework.

use wsdlstub_wsdl::{
    builder::identifier_alias,
    types::{Element, ElementType, Occurs, PrimitiveType, SchemaNode, TypeModel},
};

use super::{
    emitter::{Backend, Selection},
    error::Error,
    types::{Binding, Definition, LinkedOperation, Parameter},
};

/// `keyword.kwlist`
pub const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

const IMPORTS: &str = "from spyne import Array, Boolean, ComplexModel, DateTime, Double, Float, \
                       Integer, Long, Mandatory, ServiceBase, String, srpc";

/// Module-level names of the generated file.
pub const SPYNE_NAMES: &[&str] = &[
    "Array", "Boolean", "ComplexModel", "DateTime", "Double", "Float", "Integer", "Long",
    "Mandatory", "ServiceBase", "String", "srpc", "NAMESPACE",
];

const INDENT: &str = "    ";

/// Line-oriented Python source builder.
#[derive(Default)]
struct PyWriter {
    buffer: String,
    depth: usize,
}

impl PyWriter {
    fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.buffer.push_str(INDENT);
            }
            self.buffer.push_str(text);
        }
        self.buffer.push('\n');
    }

    fn blank(&mut self) {
        self.line("");
    }

    fn indented(&mut self, body: impl FnOnce(&mut Self)) {
        self.depth += 1;
        body(self);
        self.depth -= 1;
    }

    /// Two blank lines before a top-level statement.
    fn top_level(&mut self) {
        self.blank();
        self.blank();
    }

    fn finish(self) -> String {
        self.buffer
    }
}

fn string_literal(value: &str) -> String {
    let mut literal = String::with_capacity(value.len() + 2);
    literal.push('"');
    for c in value.chars() {
        match c {
            '"' => literal.push_str("\\\""),
            '\\' => literal.push_str("\\\\"),
            '\n' => literal.push_str("\\n"),
            '\r' => literal.push_str("\\r"),
            '\t' => literal.push_str("\\t"),
            c => literal.push(c),
        }
    }
    literal.push('"');
    literal
}

fn identifier(name: &str) -> String {
    identifier_alias(name, PYTHON_KEYWORDS).unwrap_or_else(|| name.to_owned())
}

fn primitive_name(primitive: PrimitiveType) -> &'static str {
    match primitive {
        PrimitiveType::String => "String",
        PrimitiveType::Boolean => "Boolean",
        PrimitiveType::Int | PrimitiveType::Integer => "Integer",
        PrimitiveType::Long => "Long",
        PrimitiveType::Float => "Float",
        PrimitiveType::Double => "Double",
        PrimitiveType::DateTime => "DateTime",
    }
}

fn occurs_literal(occurs: Occurs) -> String {
    match occurs {
        Occurs::Count(count) => count.to_string(),
        Occurs::Unbounded => string_literal("unbounded"),
    }
}

fn occurs_arguments(element: &Element, with_max: bool) -> Vec<String> {
    let mut arguments = Vec::new();
    if let Some(min) = element.occurs.min {
        arguments.push(format!("min_occurs={}", occurs_literal(min)));
    }
    if let (true, Some(max)) = (with_max, element.occurs.max) {
        arguments.push(format!("max_occurs={}", occurs_literal(max)));
    }
    arguments
}

/// Spyne type expression for an element, `None` for elements that are not
/// emitted.
fn element_expr(definition: &Definition, element: &Element) -> Option<String> {
    let (base, arguments) = match &element.ty {
        ElementType::Primitive(primitive) => {
            (primitive_name(*primitive).to_owned(), occurs_arguments(element, true))
        }

        ElementType::Complex(name) if element.occurs.is_repeated() => {
            let mut arguments = vec![definition.type_ident(name).to_owned()];
            arguments.extend(occurs_arguments(element, true));
            return Some(format!("Array({})", arguments.join(", ")));
        }

        ElementType::Complex(name) => (
            definition.type_ident(name).to_owned(),
            occurs_arguments(element, false),
        ),

        ElementType::Unresolved(_) | ElementType::Unknown(_) => return None,
    };

    if arguments.is_empty() {
        Some(base)
    } else {
        Some(format!("{}({})", base, arguments.join(", ")))
    }
}

enum Field {
    Declared(String),
    Comment(String),
    Omitted,
}

fn node_field(definition: &Definition, node: &SchemaNode) -> Field {
    match node {
        SchemaNode::Element(element) => match (&element.ty, element_expr(definition, element)) {
            (ElementType::Unresolved(name), _) => {
                Field::Comment(format!("# {}: unresolved type {}", element.name, name))
            }
            (_, Some(expr)) => Field::Declared(expr),
            (_, None) => Field::Omitted,
        },

        SchemaNode::Group(group) => match group.pattern() {
            Some(pattern) => Field::Declared(format!("String(pattern={})", string_literal(&pattern))),
            None => Field::Comment(format!("# {}: unresolved group", group.name)),
        },

        SchemaNode::Attribute(attribute) => Field::Declared(format!(
            "Mandatory.String(pattern={})",
            string_literal(&attribute.fixed)
        )),
    }
}

fn write_model(writer: &mut PyWriter, definition: &Definition, model: &TypeModel) {
    let name = definition.type_ident(&model.name);

    writer.top_level();
    writer.line(format!("class {}(ComplexModel):", name));
    writer.indented(|writer| {
        writer.line("__namespace__ = NAMESPACE");
        if name != model.name {
            writer.line(format!("__type_name__ = {}", string_literal(&model.name)));
        }

        for node in model.nodes.iter().filter(|node| !node.is_aliased()) {
            match node_field(definition, node) {
                Field::Declared(expr) => writer.line(format!("{} = {}", node.name(), expr)),
                Field::Comment(comment) => writer.line(comment),
                Field::Omitted => (),
            }
        }
    });

    let mut aliased = model.aliased_nodes().peekable();
    if aliased.peek().is_some() {
        writer.blank();
    }

    for node in aliased {
        match node_field(definition, node) {
            Field::Declared(expr) => writer.line(format!(
                "{}._type_info[{}] = {}",
                name,
                string_literal(node.name()),
                expr
            )),
            Field::Comment(comment) => writer.line(comment),
            Field::Omitted => (),
        }
    }
}

fn write_docstring(writer: &mut PyWriter, documentation: &str) {
    let escaped = documentation.replace('\\', "\\\\").replace("\"\"\"", "\\\"\\\"\\\"");
    let mut lines = escaped.lines().map(str::trim);

    match (lines.next(), lines.clone().next()) {
        (Some(first), None) => writer.line(format!("\"\"\"{}\"\"\"", first)),
        (Some(first), Some(_)) => {
            writer.line(format!("\"\"\"{}", first));
            for line in lines {
                writer.line(line);
            }
            writer.line("\"\"\"");
        }
        (None, _) => (),
    }
}

fn write_operation(writer: &mut PyWriter, definition: &Definition, operation: &LinkedOperation) {
    let (request, response, parameters) = match &operation.binding {
        Binding::Linked {
            request,
            response,
            parameters,
        } => (request, response, parameters),
        Binding::Missing { type_name } => {
            writer.line(format!(
                "# {} NOT IMPLEMENTED (because can't find {})",
                operation.name, type_name
            ));
            return;
        }
    };

    let mut decorator: Vec<String> = parameters
        .iter()
        .filter_map(|parameter| element_expr(definition, &parameter.element))
        .collect();
    decorator.push(format!("_returns={}", definition.type_ident(response)));

    let aliased: Vec<&Parameter> = parameters.iter().filter(|p| p.is_aliased()).collect();
    if !aliased.is_empty() {
        let names: Vec<_> = aliased
            .iter()
            .map(|p| format!("{}: {}", string_literal(&p.ident), string_literal(&p.wire_name)))
            .collect();
        decorator.push(format!("_in_variable_names={{{}}}", names.join(", ")));
    }

    let arguments: Vec<&str> = parameters.iter().map(|p| p.ident.as_str()).collect();

    let mut fields: Vec<String> = parameters
        .iter()
        .filter(|p| !p.is_aliased())
        .map(|p| format!("{}={}", p.wire_name, p.ident))
        .collect();
    if !aliased.is_empty() {
        let entries: Vec<_> = aliased
            .iter()
            .map(|p| format!("{}: {}", string_literal(&p.wire_name), p.ident))
            .collect();
        fields.push(format!("**{{{}}}", entries.join(", ")));
    }

    writer.line(format!("@srpc({})", decorator.join(", ")));
    writer.line(format!(
        "def {}({}):",
        identifier(&operation.name),
        arguments.join(", ")
    ));
    writer.indented(|writer| {
        if let Some(documentation) = &operation.documentation {
            write_docstring(writer, documentation);
        }
        writer.line(format!(
            "req = {}({})",
            definition.type_ident(request),
            fields.join(", ")
        ));
        writer.blank();
        writer.line(format!("resp = {}()", definition.type_ident(response)));
        writer.line("return resp");
    });
}

fn write_service(
    writer: &mut PyWriter,
    definition: &Definition,
    operations: &[&LinkedOperation],
) {
    writer.top_level();
    writer.line(format!("class {}(ServiceBase):", definition.service));
    writer.indented(|writer| {
        for (position, operation) in operations.iter().enumerate() {
            if position > 0 {
                writer.blank();
            }
            write_operation(writer, definition, operation);
        }

        let linked = operations
            .iter()
            .any(|operation| matches!(operation.binding, Binding::Linked { .. }));
        if !linked {
            writer.line("pass");
        }
    });
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Spyne;

impl Backend for Spyne {
    fn reserved_words(&self) -> &'static [&'static str] {
        PYTHON_KEYWORDS
    }

    fn reserved_type_names(&self) -> &'static [&'static str] {
        SPYNE_NAMES
    }

    fn render(&self, definition: &Definition, selection: &Selection<'_>) -> Result<String, Error> {
        let mut writer = PyWriter::default();

        writer.line(IMPORTS);
        writer.blank();
        writer.line(format!("NAMESPACE = {}", string_literal(&definition.namespace)));

        if !definition.dropped.is_empty() {
            writer.line(format!(
                "# Omitted models (missing or cyclic dependencies): {}",
                definition.dropped.join(", ")
            ));
        }

        for model in &selection.models {
            write_model(&mut writer, definition, model);
        }

        if !selection.operations.is_empty() {
            write_service(&mut writer, definition, &selection.operations);
        }

        Ok(writer.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        emitter::{select, Sections},
        preprocessor::preprocess,
    };

    fn render(wsdl: &str) -> String {
        let definitions = wsdlstub_wsdl::parse_str(wsdl).expect("Failed to parse");
        let definition = preprocess(&definitions, PYTHON_KEYWORDS, SPYNE_NAMES).expect("Failed to preprocess");
        let selection = select(&definition, Sections::all(), None);
        Spyne.render(&definition, &selection).expect("Failed to render")
    }

    fn wsdl(schema: &str, operations: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<definitions xmlns="http://schemas.xmlsoap.org/wsdl/"
             xmlns:xs="http://www.w3.org/2001/XMLSchema"
             xmlns:tns="urn:ping"
             targetNamespace="urn:ping">
    <types>
        <xs:schema targetNamespace="urn:ping">
            {}
        </xs:schema>
    </types>
    <portType name="PingPortType">
        {}
    </portType>
</definitions>"#,
            schema, operations
        )
    }

    const PING_SCHEMA: &str = r#"
        <xs:element name="Ping" type="tns:PingRequestType"/>
        <xs:element name="PingResponse" type="tns:PingResponseType"/>
        <xs:complexType name="PingRequestType">
            <xs:sequence>
                <xs:element name="token" type="xs:string"/>
            </xs:sequence>
        </xs:complexType>
        <xs:complexType name="PingResponseType"/>
    "#;

    #[test]
    fn test_ping() {
        let output = render(&wsdl(PING_SCHEMA, r#"<operation name="Ping"/>"#));

        let expected = format!(
            r#"{}

NAMESPACE = "urn:ping"


class PingRequestType(ComplexModel):
    __namespace__ = NAMESPACE
    token = String


class PingResponseType(ComplexModel):
    __namespace__ = NAMESPACE


class PingPortType(ServiceBase):
    @srpc(String, _returns=PingResponseType)
    def Ping(token):
        req = PingRequestType(token=token)

        resp = PingResponseType()
        return resp
"#,
            IMPORTS
        );

        assert_eq!(output, expected);
    }

    #[test]
    fn test_fields() {
        let output = render(&wsdl(
            r#"<xs:group name="Kind">
                <xs:choice>
                    <xs:element name="A" type="xs:string"/>
                    <xs:element name="B" type="xs:string"/>
                    <xs:element name="C" type="xs:string"/>
                </xs:choice>
            </xs:group>
            <xs:complexType name="Leaf"/>
            <xs:complexType name="Record">
                <xs:sequence>
                    <xs:element name="count" type="xs:int" minOccurs="0" maxOccurs="5"/>
                    <xs:element name="leaf" type="tns:Leaf" minOccurs="1"/>
                    <xs:element name="leaves" type="tns:Leaf" maxOccurs="unbounded"/>
                    <xs:element name="when" type="xs:dateTime"/>
                    <xs:element name="price" type="xs:decimal"/>
                    <xs:element name="lost" type="tns:Lost"/>
                    <xs:group ref="tns:Kind"/>
                </xs:sequence>
                <xs:attribute name="version" fixed="1.0"/>
            </xs:complexType>
            <xs:element name="Get" type="tns:Record"/>
            <xs:element name="GetResponse" type="tns:Leaf"/>"#,
            r#"<operation name="Get"/>"#,
        ));

        assert!(output.contains("    count = Integer(min_occurs=0, max_occurs=5)\n"));
        assert!(output.contains("    leaf = Leaf(min_occurs=1)\n"));
        assert!(output.contains("    leaves = Array(Leaf, max_occurs=\"unbounded\")\n"));
        assert!(output.contains("    when = DateTime\n"));
        assert!(!output.contains("price"));
        assert!(output.contains("    # lost: unresolved type Lost\n"));
        assert!(output.contains("    Kind = String(pattern=\"(A|B|C)\")\n"));
        assert!(output.contains("    version = Mandatory.String(pattern=\"1.0\")\n"));

        // Leaf is declared before Record uses it.
        let leaf = output.find("class Leaf(").expect("Leaf emitted");
        let record = output.find("class Record(").expect("Record emitted");
        assert!(leaf < record);

        assert!(output.contains(
            "    @srpc(Integer(min_occurs=0, max_occurs=5), Leaf(min_occurs=1), \
             Array(Leaf, max_occurs=\"unbounded\"), DateTime, _returns=Leaf)\n"
        ));
        assert!(output.contains("    def Get(count, leaf, leaves, when):\n"));
    }

    #[test]
    fn test_reserved_names() {
        let output = render(&wsdl(
            r#"<xs:element name="Route" type="tns:RouteRequest"/>
            <xs:element name="RouteResponse" type="tns:RouteResponse"/>
            <xs:complexType name="RouteRequest">
                <xs:sequence>
                    <xs:element name="from" type="xs:string"/>
                    <xs:element name="to" type="xs:string"/>
                </xs:sequence>
            </xs:complexType>
            <xs:complexType name="RouteResponse"/>"#,
            r#"<operation name="Route"/>"#,
        ));

        assert!(!output.contains("    from = String"));
        assert!(output.contains("    to = String\n"));
        assert!(output.contains("RouteRequest._type_info[\"from\"] = String\n"));
        assert!(output.contains(
            "    @srpc(String, String, _returns=RouteResponse, \
             _in_variable_names={\"from_\": \"from\"})\n"
        ));
        assert!(output.contains("    def Route(from_, to):\n"));
        assert!(output.contains("        req = RouteRequest(to=to, **{\"from\": from_})\n"));
    }

    #[test]
    fn test_colliding_and_non_identifier_names() {
        let output = render(&wsdl(
            r#"<xs:element name="Route" type="tns:RouteRequest"/>
            <xs:element name="RouteResponse" type="tns:RouteResponse"/>
            <xs:complexType name="RouteRequest">
                <xs:sequence>
                    <xs:element name="from" type="xs:string"/>
                    <xs:element name="from_" type="xs:string"/>
                    <xs:element name="CO₂" type="xs:double"/>
                </xs:sequence>
            </xs:complexType>
            <xs:complexType name="RouteResponse"/>"#,
            r#"<operation name="Route"/>"#,
        ));

        assert!(output.contains("    from_ = String\n"));
        assert!(output.contains("RouteRequest._type_info[\"from\"] = String\n"));
        assert!(output.contains("RouteRequest._type_info[\"CO₂\"] = Double\n"));
        assert!(output.contains(
            "_in_variable_names={\"from__\": \"from\", \"CO_\": \"CO₂\"})\n"
        ));
        assert!(output.contains("    def Route(from__, from_, CO_):\n"));
        assert!(output.contains(
            "        req = RouteRequest(from_=from_, **{\"from\": from__, \"CO₂\": CO_})\n"
        ));
    }

    #[test]
    fn test_import_names_are_not_shadowed() {
        let output = render(&wsdl(
            r#"<xs:element name="Wrap" type="tns:Array"/>
            <xs:element name="WrapResponse" type="tns:String"/>
            <xs:complexType name="Array">
                <xs:sequence>
                    <xs:element name="items" type="tns:String" maxOccurs="unbounded"/>
                    <xs:element name="label" type="xs:string"/>
                </xs:sequence>
            </xs:complexType>
            <xs:complexType name="String"/>"#,
            r#"<operation name="Wrap"/>"#,
        ));

        assert!(output.contains(
            "class String_(ComplexModel):\n    __namespace__ = NAMESPACE\n    __type_name__ = \"String\"\n"
        ));
        assert!(output.contains(
            "class Array_(ComplexModel):\n    __namespace__ = NAMESPACE\n    __type_name__ = \"Array\"\n    \
             items = Array(String_, max_occurs=\"unbounded\")\n    label = String\n"
        ));
        assert!(output.contains("    @srpc(Array(String_, max_occurs=\"unbounded\"), String, _returns=String_)\n"));
        assert!(output.contains("        req = Array_(items=items, label=label)\n"));
        assert!(!output.contains("class String("));
    }

    #[test]
    fn test_missing_type_stub() {
        let output = render(&wsdl(
            PING_SCHEMA,
            r#"<operation name="Lost"/>
            <operation name="Ping">
                <documentation>Liveness check.</documentation>
            </operation>"#,
        ));

        assert!(output.contains("    # Lost NOT IMPLEMENTED (because can't find Lost)\n"));
        assert!(output.contains("        \"\"\"Liveness check.\"\"\"\n"));
        assert!(output.contains("    def Ping(token):\n"));
    }

    #[test]
    fn test_service_without_linked_operations() {
        let output = render(&wsdl("", r#"<operation name="Lost"/>"#));

        assert!(output.ends_with(
            "class PingPortType(ServiceBase):\n    \
             # Lost NOT IMPLEMENTED (because can't find Lost)\n    pass\n"
        ));
    }

    #[test]
    fn test_dropped_models_listed() {
        let output = render(&wsdl(
            r#"<xs:element name="Loop" type="tns:Node"/>
            <xs:element name="LoopResponse" type="tns:Node"/>
            <xs:complexType name="Node">
                <xs:sequence>
                    <xs:element name="next" type="tns:Node" minOccurs="0"/>
                </xs:sequence>
            </xs:complexType>"#,
            r#"<operation name="Loop"/>"#,
        ));

        assert!(output.contains("# Omitted models (missing or cyclic dependencies): Node\n"));
        assert!(!output.contains("class Node("));
        assert!(output.contains("# Loop NOT IMPLEMENTED (because can't find Node)"));
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(string_literal("a\"b\\c\n"), "\"a\\\"b\\\\c\\n\"");
    }
}
