use super::xml::{self, Element};
use super::{DESCRIPTION, IS_FINAL_STATE, IS_START_STATE, STATE_NAME, TRANSITION_PREDICATE};
use crate::automaton::{Automaton, GraphEvent, GraphListener, Predicate, Registry, Transition};
use crate::codec::{Diagnostics, Warning};
use crate::{Error, Result};
use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;

/// A `<key>` declaration.
#[derive(Debug)]
struct KeyDecl {
    name: String,
    domain: String,
    default: Option<String>,
}

/// Key declarations of one document, by key id.
#[derive(Debug, Default)]
struct KeyTable {
    keys: HashMap<String, KeyDecl>,
}

impl KeyTable {
    fn from_root(root: &Element) -> Result<Self> {
        let mut keys = HashMap::new();
        for key in root.children_named("key") {
            let id = key
                .attr("id")
                .ok_or_else(|| Error::malformed("<key> without id"))?;
            let decl = KeyDecl {
                name: key.attr("attr.name").unwrap_or(id).to_string(),
                domain: key.attr("for").unwrap_or("all").to_string(),
                default: key.child("default").map(|d| d.text.clone()),
            };
            keys.insert(id.to_string(), decl);
        }
        Ok(Self { keys })
    }

    /// Data values of a node or edge by attribute name, key defaults included.
    fn values(&self, element: &Element, domain: &str) -> Result<HashMap<String, String>> {
        let mut values: HashMap<String, String> = self
            .keys
            .values()
            .filter(|k| k.domain == domain || k.domain == "all")
            .filter_map(|k| k.default.clone().map(|d| (k.name.clone(), d)))
            .collect();

        for data in element.children_named("data") {
            let key = data.attr("key").ok_or_else(|| {
                Error::malformed(format!("<data> without key inside <{}>", element.name))
            })?;
            let name = self
                .keys
                .get(key)
                .map(|k| k.name.clone())
                .unwrap_or_else(|| key.to_string());
            values.insert(name, data.text.clone());
        }
        Ok(values)
    }
}

fn parse_flag(values: &HashMap<String, String>, key: &str, owner: &str) -> Result<bool> {
    match values.get(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) if v == "true" || v == "1" => Ok(true),
        Some(v) if v == "false" || v == "0" => Ok(false),
        Some(v) => Err(Error::malformed(format!(
            "{} of {} is not a boolean: {}",
            key, owner, v
        ))),
    }
}

/// Reads GraphML documents into automata, resolving predicates through a
/// [`Registry`].
pub struct GraphMlReader<'r, S> {
    registry: &'r Registry<S>,
    listeners: Vec<GraphListener<S>>,
}

impl<'r, S> GraphMlReader<'r, S> {
    pub fn new(registry: &'r Registry<S>) -> Self {
        Self {
            registry,
            listeners: Vec::new(),
        }
    }

    /// Subscribe a listener to the graph of every automaton this reader builds,
    /// before any node or edge is materialized.
    pub fn observe<F>(mut self, listener: F) -> Self
    where
        F: Fn(&GraphEvent<'_, S>) + Send + Sync + 'static,
    {
        self.listeners.push(Arc::new(listener));
        self
    }

    pub fn read<R: Read>(&self, mut source: R, diagnostics: &mut Diagnostics) -> Result<Automaton<S>> {
        let mut text = String::new();
        source.read_to_string(&mut text)?;
        self.read_str(&text, diagnostics)
    }

    pub fn read_str(&self, text: &str, diagnostics: &mut Diagnostics) -> Result<Automaton<S>> {
        let root = xml::parse(text)?;
        if root.name != "graphml" {
            return Err(Error::malformed(format!(
                "root element is <{}>, expected <graphml>",
                root.name
            )));
        }
        let keys = KeyTable::from_root(&root)?;
        let graph = root
            .child("graph")
            .ok_or_else(|| Error::malformed("<graphml> has no <graph>"))?;

        let mut automaton = Automaton::new();
        for listener in &self.listeners {
            automaton.graph_mut().subscribe_shared(Arc::clone(listener));
        }

        let mut names: HashMap<&str, String> = HashMap::new();
        let mut start_state: Option<String> = None;
        let mut final_states = Vec::new();

        for node in graph.children_named("node") {
            let id = node
                .attr("id")
                .ok_or_else(|| Error::malformed("<node> without id"))?;
            let values = keys.values(node, "node")?;
            let name = values
                .get(STATE_NAME)
                .cloned()
                .ok_or_else(|| Error::malformed(format!("node {} has no {}", id, STATE_NAME)))?;

            if names.insert(id, name.clone()).is_some() {
                return Err(Error::malformed(format!("node id {} is used twice", id)));
            }
            automaton.add_state(name.clone()).map_err(|e| match e {
                Error::DuplicateState(name) => {
                    Error::malformed(format!("state {} is declared twice", name))
                }
                other => other,
            })?;

            if parse_flag(&values, IS_START_STATE, id)? {
                if let Some(previous) = start_state.replace(name.clone()) {
                    return Err(Error::malformed(format!(
                        "both {} and {} are marked as start state",
                        previous, name
                    )));
                }
            }
            if parse_flag(&values, IS_FINAL_STATE, id)? {
                final_states.push(name);
            }
        }

        if let Some(start) = &start_state {
            automaton.set_start_state(start)?;
        }
        for name in &final_states {
            automaton.set_final_state(name)?;
        }

        for (index, edge) in graph.children_named("edge").enumerate() {
            let id = edge
                .attr("id")
                .map(str::to_string)
                .unwrap_or_else(|| format!("e{}", index));
            let source = self.endpoint(edge, "source", &id, &names)?;
            let target = self.endpoint(edge, "target", &id, &names)?;
            let values = keys.values(edge, "edge")?;

            let predicate = self.resolve(&id, values.get(TRANSITION_PREDICATE), diagnostics);
            let mut transition = Transition::new(source, target, predicate);
            if let Some(description) = values.get(DESCRIPTION) {
                transition = transition.with_description(description.clone());
            }
            automaton.add_transition(transition)?;
        }

        tracing::debug!(
            "Imported {} states and {} transitions from GraphML ({} warnings)",
            automaton.state_count(),
            automaton.transition_count(),
            diagnostics.len()
        );
        Ok(automaton)
    }

    fn endpoint(
        &self,
        edge: &Element,
        attribute: &str,
        id: &str,
        names: &HashMap<&str, String>,
    ) -> Result<String> {
        let node = edge
            .attr(attribute)
            .ok_or_else(|| Error::malformed(format!("edge {} has no {}", id, attribute)))?;
        names.get(node).cloned().ok_or_else(|| {
            Error::malformed(format!("edge {} references unknown node {}", id, node))
        })
    }

    fn resolve(
        &self,
        edge: &str,
        encoded: Option<&String>,
        diagnostics: &mut Diagnostics,
    ) -> Predicate<S> {
        let Some(encoded) = encoded else {
            diagnostics.warn(Warning::PredicateUnresolved {
                edge: edge.to_string(),
                encoded: None,
                reason: format!("no {} data", TRANSITION_PREDICATE),
            });
            return Predicate::never();
        };

        match self.registry.resolve_predicate(encoded) {
            Ok(predicate) => predicate,
            Err(reason) => {
                diagnostics.warn(Warning::PredicateUnresolved {
                    edge: edge.to_string(),
                    encoded: Some(encoded.clone()),
                    reason: reason.to_string(),
                });
                Predicate::never()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::exchange::{node_id, GraphMlWriter};
    use std::sync::Mutex;

    fn always(_: &char) -> bool {
        true
    }

    fn is_zero(c: &char) -> bool {
        *c == '0'
    }

    fn registry() -> Registry<char> {
        Registry::new()
            .with_predicate(crate::predicate!(always))
            .unwrap()
            .with_predicate(crate::predicate!(is_zero))
            .unwrap()
    }

    fn sample() -> Automaton<char> {
        let mut automaton = Automaton::new();
        automaton.add_states(["even", "odd", "dead"]).unwrap();
        automaton.set_start_state("even").unwrap();
        automaton.set_final_state("even").unwrap();
        automaton.set_final_state("dead").unwrap();
        automaton
            .add_transition(Transition::new("even", "odd", crate::predicate!(is_zero)))
            .unwrap();
        automaton
            .add_transition(
                Transition::new("odd", "even", crate::predicate!(is_zero)).with_description("zero"),
            )
            .unwrap();
        automaton
            .add_transition(Transition::new("odd", "odd", crate::predicate!(always)))
            .unwrap();
        automaton
    }

    #[test]
    fn test_round_trip() {
        let original = sample();
        let mut diagnostics = Diagnostics::new();
        let xml = GraphMlWriter::new()
            .write_to_string(&original, &mut diagnostics)
            .unwrap();
        let registry = registry();
        let restored = GraphMlReader::new(&registry)
            .read_str(&xml, &mut diagnostics)
            .unwrap();

        assert!(diagnostics.is_empty());
        assert_eq!(
            restored.states().collect::<Vec<_>>(),
            original.states().collect::<Vec<_>>()
        );
        assert_eq!(restored.start_state(), Some("even"));
        assert_eq!(restored.final_states().collect::<Vec<_>>(), vec!["even", "dead"]);
        let pairs: Vec<_> = original.transitions().zip(restored.transitions()).collect();
        assert_eq!(pairs.len(), 3);
        for (a, b) in pairs {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_unresolved_predicates_become_never() {
        let doc = format!(
            r#"<graphml>
                <key id="d0" for="node" attr.name="stateName" attr.type="string"/>
                <key id="d1" for="edge" attr.name="transitionPredicate" attr.type="string"/>
                <graph edgedefault="directed">
                  <node id="a"><data key="d0">A</data></node>
                  <node id="b"><data key="d0">B</data></node>
                  <edge id="x" source="a" target="b"><data key="d1">is_zero;elsewhere</data></edge>
                  <edge id="y" source="b" target="a"/>
                  <edge id="z" source="a" target="a"><data key="d1">is_zero;{}</data></edge>
                  <edge id="w" source="a" target="b"><data key="d1">is_one;{}</data></edge>
                </graph>
              </graphml>"#,
            module_path!(),
            module_path!()
        );

        let registry = registry();
        let mut diagnostics = Diagnostics::new();
        let automaton = GraphMlReader::new(&registry)
            .read_str(&doc, &mut diagnostics)
            .unwrap();

        let transitions: Vec<_> = automaton.transitions().collect();
        assert_eq!(transitions.len(), 4);
        assert_eq!(transitions[0].predicate(), &Predicate::never());
        assert_eq!(transitions[0].description(), "never");
        assert_eq!(transitions[1].predicate(), &Predicate::never());
        assert_eq!(transitions[2].predicate(), &crate::predicate!(is_zero));
        assert_eq!(transitions[3].predicate(), &Predicate::never());
        assert!(!transitions[3].fires_on(&'1'));
        assert_eq!(automaton.start_state(), None);

        let edges: Vec<_> = diagnostics
            .warnings()
            .iter()
            .map(|w| match w {
                Warning::PredicateUnresolved { edge, .. } => edge.as_str(),
                other => panic!("unexpected warning {other}"),
            })
            .collect();
        assert_eq!(edges, vec!["x", "y", "w"]);
    }

    #[test]
    fn test_key_defaults_are_honoured() {
        let doc = r#"<graphml>
            <key id="name" for="node" attr.name="stateName"/>
            <key id="fin" for="node" attr.name="isFinalState" attr.type="boolean"><default>true</default></key>
            <graph>
              <node id="1"><data key="name">only</data></node>
              <node id="2"><data key="name">other</data><data key="fin">false</data></node>
            </graph>
          </graphml>"#;

        let registry = registry();
        let automaton = GraphMlReader::new(&registry)
            .read_str(doc, &mut Diagnostics::new())
            .unwrap();
        assert!(automaton.is_final_state("only"));
        assert!(!automaton.is_final_state("other"));
    }

    #[test]
    fn test_listeners_see_materialization() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);

        let mut diagnostics = Diagnostics::new();
        let xml = GraphMlWriter::new()
            .write_to_string(&sample(), &mut diagnostics)
            .unwrap();
        let registry = registry();
        GraphMlReader::new(&registry)
            .observe(move |event: &GraphEvent<'_, char>| {
                let line = match event {
                    GraphEvent::VertexAdded(name) => format!("+{}", name),
                    GraphEvent::EdgeAdded(t) => format!("{}->{}", t.source(), t.target()),
                };
                sink.lock().unwrap().push(line);
            })
            .read_str(&xml, &mut diagnostics)
            .unwrap();

        assert_eq!(
            *events.lock().unwrap(),
            vec!["+even", "+odd", "+dead", "even->odd", "odd->even", "odd->odd"]
        );
    }

    #[test]
    fn test_malformed_documents_are_fatal() {
        let registry = registry();
        let a = node_id("a");
        let cases = [
            "not xml at all <".to_string(),
            "<root/>".to_string(),
            "<graphml></graphml>".to_string(),
            "<graphml><graph><node/></graph></graphml>".to_string(),
            r#"<graphml><graph><node id="a"/></graph></graphml>"#.to_string(),
            format!(
                r#"<graphml><graph><node id="{a}"><data key="stateName">a</data></node><node id="{a}"><data key="stateName">b</data></node></graph></graphml>"#
            ),
            r#"<graphml><graph><node id="1"><data key="stateName">a</data></node><node id="2"><data key="stateName">a</data></node></graph></graphml>"#.to_string(),
            r#"<graphml><graph><node id="1"><data key="stateName">a</data></node><edge source="1" target="9"/></graph></graphml>"#.to_string(),
            r#"<graphml><graph><node id="1"><data key="stateName">a</data></node><edge target="1"/></graph></graphml>"#.to_string(),
            r#"<graphml><graph><node id="1"><data key="stateName">a</data><data key="isStartState">maybe</data></node></graph></graphml>"#.to_string(),
            r#"<graphml><graph><node id="1"><data key="stateName">a</data><data key="isStartState">true</data></node><node id="2"><data key="stateName">b</data><data key="isStartState">true</data></node></graph></graphml>"#.to_string(),
            r#"<graphml><graph><node id="1"><data>a</data></node></graph></graphml>"#.to_string(),
        ];

        for doc in &cases {
            let mut diagnostics = Diagnostics::new();
            let result = GraphMlReader::new(&registry).read_str(doc, &mut diagnostics);
            assert!(result.is_err(), "accepted malformed document: {}", doc);
        }
    }

    #[test]
    fn test_read_from_reader() {
        let mut diagnostics = Diagnostics::new();
        let xml = GraphMlWriter::new()
            .write_to_string(&sample(), &mut diagnostics)
            .unwrap();
        let registry = registry();
        let automaton = GraphMlReader::new(&registry)
            .read(xml.as_bytes(), &mut diagnostics)
            .unwrap();
        assert_eq!(automaton.transition_count(), 3);
    }

    #[test]
    fn test_surrounding_whitespace_survives_round_trip() {
        let mut original: Automaton<char> = Automaton::new();
        original.add_states(["a", " a", "b "]).unwrap();
        original.set_start_state(" a").unwrap();
        original.set_final_state("b ").unwrap();
        original
            .add_transition(
                Transition::new(" a", "b ", crate::predicate!(is_zero)).with_description("  spaced  "),
            )
            .unwrap();

        let registry = registry();
        for indent in [0, 2] {
            let mut diagnostics = Diagnostics::new();
            let xml = GraphMlWriter::new()
                .with_indent(indent)
                .write_to_string(&original, &mut diagnostics)
                .unwrap();
            let restored = GraphMlReader::new(&registry)
                .read_str(&xml, &mut diagnostics)
                .unwrap();

            assert!(diagnostics.is_empty());
            assert_eq!(restored.states().collect::<Vec<_>>(), vec!["a", " a", "b "]);
            assert_eq!(restored.start_state(), Some(" a"));
            assert_eq!(restored.final_states().collect::<Vec<_>>(), vec!["b "]);
            let transition = restored.transitions().next().unwrap();
            assert_eq!(transition.source(), " a");
            assert_eq!(transition.target(), "b ");
            assert_eq!(transition.description(), "  spaced  ");
        }
    }
}
