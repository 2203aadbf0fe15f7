//! SOAP envelope encoding and response decoding for LDBWS.
//!
//! # Responsibilities
//! - Build request envelopes carrying the access token header
//! - Parse response XML into a `SourceNode` tree
//! - Surface SOAP faults as `UpstreamError::Fault`
//!
//! # Design Decisions
//! - Namespace prefixes are dropped; only local names reach the tree
//! - Elements marked `xsi:nil="true"` are treated as absent
//! - Array containers decode to sequences even with zero or one item, so the
//!   projection layer never has to guess whether a field is a list
//! - Text is kept verbatim; whitespace between child elements is dropped
//! - An element that had child elements stays a map even when every child
//!   was nil

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::projection::SourceNode;
use crate::upstream::types::{UpstreamError, UpstreamRequest, UpstreamResult};

pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const COMMON_TYPES_NS: &str = "http://thalesgroup.com/RTTI/2010-11-01/ldb/commontypes";
pub const LDB_NS: &str = "http://thalesgroup.com/RTTI/2014-02-20/ldb/";
pub const SOAP_ACTION_BASE: &str = "http://thalesgroup.com/RTTI/2012-01-13/ldb/";

/// LDBWS elements whose children form an ordered list.
const ARRAY_CONTAINERS: &[&str] = &[
    "trainServices",
    "busServices",
    "ferryServices",
    "nrccMessages",
    "origin",
    "destination",
    "adhocAlerts",
    "previousCallingPoints",
    "subsequentCallingPoints",
    "callingPointList",
];

/// LDBWS list items that are always structures, even when empty.
const OBJECT_ELEMENTS: &[&str] = &["service", "location", "callingPoint"];

/// Value of the `SOAPAction` header for a request.
pub fn soap_action(request: &UpstreamRequest) -> String {
    format!("{SOAP_ACTION_BASE}{}", request.operation())
}

/// Build the request envelope.
pub fn encode_request(request: &UpstreamRequest, access_token: &str) -> String {
    let operation = request.operation();
    let mut body = String::new();

    match request {
        UpstreamRequest::DepartureBoard(board) | UpstreamRequest::ArrivalBoard(board) => {
            push_element(&mut body, "numRows", &board.num_rows.to_string());
            push_element(&mut body, "crs", &board.crs);
            if let Some(filter) = &board.filter {
                push_element(&mut body, "filterCrs", &filter.crs);
                push_element(&mut body, "filterType", filter.direction.as_str());
            }
        }
        UpstreamRequest::ServiceDetails { service_id } => {
            push_element(&mut body, "serviceID", service_id);
        }
    }

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            r#"<soap:Envelope xmlns:soap="{envelope}" xmlns:com="{common}" xmlns:ldb="{ldb}">"#,
            "<soap:Header><com:AccessToken><com:TokenValue>{token}</com:TokenValue></com:AccessToken></soap:Header>",
            "<soap:Body><ldb:{operation}Request>{body}</ldb:{operation}Request></soap:Body>",
            "</soap:Envelope>",
        ),
        envelope = SOAP_ENVELOPE_NS,
        common = COMMON_TYPES_NS,
        ldb = LDB_NS,
        token = escape(access_token),
        operation = operation,
        body = body,
    )
}

fn push_element(out: &mut String, name: &str, value: &str) {
    out.push_str(&format!("<ldb:{name}>{}</ldb:{name}>", escape(value)));
}

/// Decode a response body for `operation` into the result node.
///
/// Expects `Envelope/Body/{operation}Response/{result}`; the single result
/// element becomes the returned node.
pub fn decode_response(operation: &str, xml: &str) -> UpstreamResult<SourceNode> {
    let envelope = parse_document(xml)?;
    if envelope.name != "Envelope" {
        return Err(decode_error(format!("expected Envelope, found {}", envelope.name)));
    }

    let payload = envelope
        .child("Body")
        .and_then(|body| body.children.first())
        .ok_or_else(|| decode_error("empty SOAP body"))?;

    if payload.name == "Fault" {
        return Err(UpstreamError::Fault {
            code: payload.child_text("faultcode").unwrap_or_default(),
            message: payload.child_text("faultstring").unwrap_or_default(),
        });
    }

    let expected = format!("{operation}Response");
    if payload.name != expected {
        return Err(decode_error(format!("expected {expected}, found {}", payload.name)));
    }

    let result = payload
        .children
        .first()
        .ok_or_else(|| decode_error(format!("{expected} has no result")))?;

    Ok(result.to_map())
}

fn decode_error(message: impl Into<String>) -> UpstreamError {
    UpstreamError::Decode(message.into())
}

/// Minimal element tree; nil elements are dropped while parsing.
#[derive(Debug, Default)]
struct XmlElement {
    name: String,
    text: String,
    children: Vec<XmlElement>,
    /// Set for any child element, including nil ones not kept in `children`.
    has_element_children: bool,
}

impl XmlElement {
    fn from_start(start: &BytesStart<'_>) -> (Self, bool) {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let nil = start.attributes().flatten().any(|attr| {
            attr.key.local_name().as_ref() == b"nil" && attr.value.as_ref() == b"true"
        });
        (
            Self {
                name,
                ..Self::default()
            },
            nil,
        )
    }

    fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).map(|c| c.text.clone())
    }

    fn to_node(&self) -> SourceNode {
        let name = self.name.as_str();
        if ARRAY_CONTAINERS.contains(&name) {
            return SourceNode::Sequence(self.children.iter().map(XmlElement::to_node).collect());
        }
        if self.has_element_children || OBJECT_ELEMENTS.contains(&name) {
            return self.to_map();
        }
        SourceNode::Scalar(self.text.clone())
    }

    fn to_map(&self) -> SourceNode {
        SourceNode::Map(
            self.children
                .iter()
                .map(|c| (c.name.clone(), c.to_node()))
                .collect(),
        )
    }
}

/// Parse `xml` and return its root element.
fn parse_document(xml: &str) -> UpstreamResult<XmlElement> {
    let mut reader = Reader::from_str(xml);

    // (element, is_nil)
    let mut stack: Vec<(XmlElement, bool)> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event().map_err(|e| decode_error(e.to_string()))? {
            Event::Start(start) => stack.push(XmlElement::from_start(&start)),
            Event::Empty(start) => {
                let (element, nil) = XmlElement::from_start(&start);
                attach(&mut stack, &mut root, element, nil);
            }
            Event::End(_) => {
                let (element, nil) = stack
                    .pop()
                    .ok_or_else(|| decode_error("unbalanced end tag"))?;
                attach(&mut stack, &mut root, element, nil);
            }
            Event::Text(text) => {
                if let Some((top, _)) = stack.last_mut() {
                    let text = text.unescape().map_err(|e| decode_error(e.to_string()))?;
                    top.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                if let Some((top, _)) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(decode_error("unexpected end of document"));
    }
    root.ok_or_else(|| decode_error("document has no root element"))
}

fn attach(
    stack: &mut [(XmlElement, bool)],
    root: &mut Option<XmlElement>,
    element: XmlElement,
    nil: bool,
) {
    match stack.last_mut() {
        Some((parent, _)) => {
            parent.has_element_children = true;
            if !nil {
                parent.children.push(element);
            }
        }
        None => *root = Some(element),
    }
}
