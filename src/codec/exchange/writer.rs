use super::{
    node_id, DESCRIPTION, GRAPHML_NAMESPACE, IS_FINAL_STATE, IS_START_STATE, STATE_NAME,
    TRANSITION_PREDICATE,
};
use crate::automaton::Automaton;
use crate::codec::{Diagnostics, Warning};
use crate::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::HashMap;
use std::io::Write;

struct KeySpec {
    name: &'static str,
    domain: &'static str,
    ty: &'static str,
    default: Option<&'static str>,
}

const KEYS: [KeySpec; 5] = [
    KeySpec {
        name: STATE_NAME,
        domain: "node",
        ty: "string",
        default: None,
    },
    KeySpec {
        name: IS_START_STATE,
        domain: "node",
        ty: "boolean",
        default: Some("false"),
    },
    KeySpec {
        name: IS_FINAL_STATE,
        domain: "node",
        ty: "boolean",
        default: Some("false"),
    },
    KeySpec {
        name: DESCRIPTION,
        domain: "edge",
        ty: "string",
        default: None,
    },
    KeySpec {
        name: TRANSITION_PREDICATE,
        domain: "edge",
        ty: "string",
        default: None,
    },
];

/// Writes automata as GraphML.
#[derive(Debug, Clone)]
pub struct GraphMlWriter {
    indent: usize,
}

impl GraphMlWriter {
    pub fn new() -> Self {
        Self { indent: 2 }
    }

    /// Spaces per nesting level; 0 writes everything on one line.
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn write<S, W: Write>(
        &self,
        automaton: &Automaton<S>,
        sink: W,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        let mut xml = if self.indent == 0 {
            Writer::new(sink)
        } else {
            Writer::new_with_indent(sink, b' ', self.indent)
        };

        xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        open(&mut xml, "graphml", &[("xmlns", GRAPHML_NAMESPACE)])?;

        for key in &KEYS {
            let attributes = [
                ("id", key.name),
                ("for", key.domain),
                ("attr.name", key.name),
                ("attr.type", key.ty),
            ];
            match key.default {
                Some(default) => {
                    open(&mut xml, "key", &attributes)?;
                    text_element(&mut xml, "default", &[], default)?;
                    close(&mut xml, "key")?;
                }
                None => {
                    let mut element = BytesStart::new("key");
                    element.extend_attributes(attributes);
                    xml.write_event(Event::Empty(element))?;
                }
            }
        }

        open(&mut xml, "graph", &[("id", "G"), ("edgedefault", "directed")])?;

        let mut ids: HashMap<&str, String> = HashMap::new();
        let mut owners: HashMap<String, &str> = HashMap::new();
        for state in automaton.states() {
            let id = node_id(state);
            if let Some(other) = owners.insert(id.clone(), state) {
                crate::bail!("node id {} derived from both '{}' and '{}'", id, other, state);
            }

            open(&mut xml, "node", &[("id", id.as_str())])?;
            data(&mut xml, STATE_NAME, state)?;
            if automaton.start_state() == Some(state) {
                data(&mut xml, IS_START_STATE, "true")?;
            }
            if automaton.is_final_state(state) {
                data(&mut xml, IS_FINAL_STATE, "true")?;
            }
            close(&mut xml, "node")?;
            ids.insert(state, id);
        }

        for (index, transition) in automaton.transitions().enumerate() {
            let edge_id = format!("e{}", index);
            open(
                &mut xml,
                "edge",
                &[
                    ("id", edge_id.as_str()),
                    ("source", ids[transition.source()].as_str()),
                    ("target", ids[transition.target()].as_str()),
                ],
            )?;
            data(&mut xml, DESCRIPTION, transition.description())?;
            match transition.predicate().encoded() {
                Some(encoded) => data(&mut xml, TRANSITION_PREDICATE, &encoded)?,
                None => diagnostics.warn(Warning::PredicateNotEncodable {
                    edge: edge_id.clone(),
                    transition: transition.to_string(),
                    predicate: transition.predicate().name().to_string(),
                }),
            }
            close(&mut xml, "edge")?;
        }

        close(&mut xml, "graph")?;
        close(&mut xml, "graphml")?;
        xml.into_inner().flush()?;

        tracing::debug!(
            "Exported {} states and {} transitions to GraphML",
            automaton.state_count(),
            automaton.transition_count()
        );
        Ok(())
    }

    pub fn write_to_string<S>(
        &self,
        automaton: &Automaton<S>,
        diagnostics: &mut Diagnostics,
    ) -> Result<String> {
        let mut buffer = Vec::new();
        self.write(automaton, &mut buffer, diagnostics)?;
        String::from_utf8(buffer).map_err(|e| crate::custom_error!("GraphML is not UTF-8: {}", e))
    }
}

impl Default for GraphMlWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn open<W: Write>(xml: &mut Writer<W>, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
    let mut element = BytesStart::new(name);
    element.extend_attributes(attributes.iter().copied());
    xml.write_event(Event::Start(element))?;
    Ok(())
}

fn close<W: Write>(xml: &mut Writer<W>, name: &str) -> Result<()> {
    xml.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn text_element<W: Write>(
    xml: &mut Writer<W>,
    name: &str,
    attributes: &[(&str, &str)],
    text: &str,
) -> Result<()> {
    open(xml, name, attributes)?;
    xml.write_event(Event::Text(BytesText::new(text)))?;
    close(xml, name)
}

fn data<W: Write>(xml: &mut Writer<W>, key: &str, value: &str) -> Result<()> {
    text_element(xml, "data", &[("key", key)], value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::{Predicate, Transition};

    fn always(_: &char) -> bool {
        true
    }

    fn sample() -> Automaton<char> {
        let mut automaton = Automaton::new();
        automaton.add_states(["mod=0", "mod=1"]).unwrap();
        automaton.set_start_state("mod=0").unwrap();
        automaton.set_final_state("mod=1").unwrap();
        automaton
            .add_transition(
                Transition::new("mod=0", "mod=1", crate::predicate!(always))
                    .with_description("a \"quoted\" <label>"),
            )
            .unwrap();
        automaton
    }

    #[test]
    fn test_document_shape() {
        let mut diagnostics = Diagnostics::new();
        let xml = GraphMlWriter::new()
            .write_to_string(&sample(), &mut diagnostics)
            .unwrap();

        assert!(diagnostics.is_empty());
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains(r#"<graphml xmlns="http://graphml.graphdrawing.org/xmlns">"#));
        assert!(xml.contains(r#"<key id="isStartState" for="node" attr.name="isStartState" attr.type="boolean">"#));
        assert!(xml.contains(r#"<graph id="G" edgedefault="directed">"#));
        assert!(xml.contains(&format!(r#"<node id="{}">"#, node_id("mod=0"))));
        assert!(xml.contains(r#"<data key="stateName">mod=0</data>"#));
        assert_eq!(xml.matches(r#"<data key="isStartState">true</data>"#).count(), 1);
        assert_eq!(xml.matches(r#"<data key="isFinalState">true</data>"#).count(), 1);
        assert!(xml.contains(&format!(
            r#"<edge id="e0" source="{}" target="{}">"#,
            node_id("mod=0"),
            node_id("mod=1")
        )));
        assert!(xml.contains("a &quot;quoted&quot; &lt;label&gt;"));
        assert!(xml.contains(&format!(
            r#"<data key="transitionPredicate">always;{}</data>"#,
            module_path!()
        )));
    }

    #[test]
    fn test_bound_predicate_is_dropped_with_warning() {
        let mut automaton = sample();
        let target = 'z';
        automaton
            .add_transition(Transition::new(
                "mod=1",
                "mod=0",
                Predicate::from_fn("is_target", move |c: &char| *c == target),
            ))
            .unwrap();

        let mut diagnostics = Diagnostics::new();
        let xml = GraphMlWriter::new()
            .with_indent(0)
            .write_to_string(&automaton, &mut diagnostics)
            .unwrap();

        assert_eq!(xml.matches("transitionPredicate\">").count(), 1);
        assert!(xml.contains(r#"<edge id="e1""#));
        assert!(!xml.contains('\n'));
        assert_eq!(
            diagnostics.warnings(),
            &[Warning::PredicateNotEncodable {
                edge: "e1".to_string(),
                transition: "mod=1 -> mod=0 [is_target]".to_string(),
                predicate: "is_target".to_string(),
            }]
        );
    }

    #[test]
    fn test_unwritable_sink_fails() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("disk full"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut diagnostics = Diagnostics::new();
        assert!(GraphMlWriter::new()
            .write(&sample(), Broken, &mut diagnostics)
            .is_err());
    }
}
