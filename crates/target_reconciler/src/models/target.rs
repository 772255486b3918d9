// SPDX-License-Identifier: Apache-2.0

use anyhow::{Context, Result, bail};
use roxmltree::{Document, Node};

/// An Eclipse PDE target-platform definition, in the shape both read from
/// input `.target` files and written back out after reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Target {
    pub name: String,
    pub include_mode: Option<String>,
    pub sequence_number: Option<String>,
    pub launcher_args: Option<LauncherArgs>,
    pub target_jre: Option<String>,
    pub environment: Option<Environment>,
    pub locations: Vec<Location>,
    /// Extra plugin ids included regardless of location-based selection.
    pub include_bundles: Option<Vec<Plugin>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct LauncherArgs {
    pub program_args: Option<String>,
    pub vm_args: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Environment {
    pub os: Option<String>,
    pub ws: Option<String>,
    pub arch: Option<String>,
    pub nl: Option<String>,
}

/// One repository reference inside a target with its selected units.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Location {
    pub include_mode: Option<String>,
    pub location_type: Option<String>,
    pub include_all_platforms: Option<String>,
    pub include_configure_phase: Option<String>,
    /// Repository URL as stored in the target file.
    pub repository: String,
    pub units: Vec<Unit>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Unit {
    pub id: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Plugin {
    pub id: String,
    pub version: Option<String>,
}

impl Target {
    pub fn from_xml(xml: &str) -> Result<Self> {
        let doc = Document::parse(xml).context("target file is not well-formed XML")?;
        let root = doc.root_element();
        if !root.has_tag_name("target") {
            bail!("expected root element <target>, found <{}>", root.tag_name().name());
        }
        let name = root
            .attribute("name")
            .context("<target> is missing the name attribute")?
            .to_string();

        let mut target = Target {
            name,
            include_mode: attr(&root, "includeMode"),
            sequence_number: attr(&root, "sequenceNumber"),
            ..Target::default()
        };

        for node in root.children().filter(Node::is_element) {
            match node.tag_name().name() {
                "locations" => {
                    for loc in node.children().filter(|n| n.has_tag_name("location")) {
                        target.locations.push(parse_location(&loc)?);
                    }
                }
                "environment" => {
                    target.environment = Some(Environment {
                        os: elem_text(&node, "os"),
                        ws: elem_text(&node, "ws"),
                        arch: elem_text(&node, "arch"),
                        nl: elem_text(&node, "nl"),
                    });
                }
                "targetJRE" => target.target_jre = attr(&node, "path"),
                "launcherArgs" => {
                    target.launcher_args = Some(LauncherArgs {
                        program_args: elem_text(&node, "programArgs"),
                        vm_args: elem_text(&node, "vmArgs"),
                    });
                }
                "includeBundles" => {
                    let plugins = node
                        .children()
                        .filter(|n| n.has_tag_name("plugin"))
                        .filter_map(|p| {
                            p.attribute("id").map(|id| Plugin {
                                id: id.to_string(),
                                version: attr(&p, "version"),
                            })
                        })
                        .collect();
                    target.include_bundles = Some(plugins);
                }
                _ => {}
            }
        }
        Ok(target)
    }

    /// Serializes the target back into PDE target-file XML, including the
    /// `<?pde?>` processing instruction Eclipse expects.
    pub fn to_xml(&self) -> String {
        let mut out = String::with_capacity(1024);
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\n");
        out.push_str("<?pde version=\"3.8\"?>\n");

        out.push_str(&format!("<target name=\"{}\"", escape(&self.name)));
        push_attr(&mut out, "includeMode", self.include_mode.as_deref());
        push_attr(&mut out, "sequenceNumber", self.sequence_number.as_deref());
        out.push_str(">\n");

        out.push_str("  <locations>\n");
        for location in &self.locations {
            write_location(&mut out, location);
        }
        out.push_str("  </locations>\n");

        if let Some(env) = &self.environment {
            out.push_str("  <environment>\n");
            write_text_elem(&mut out, "os", env.os.as_deref());
            write_text_elem(&mut out, "ws", env.ws.as_deref());
            write_text_elem(&mut out, "arch", env.arch.as_deref());
            write_text_elem(&mut out, "nl", env.nl.as_deref());
            out.push_str("  </environment>\n");
        }

        if let Some(path) = &self.target_jre {
            out.push_str(&format!("  <targetJRE path=\"{}\"/>\n", escape(path)));
        }

        if let Some(args) = &self.launcher_args {
            out.push_str("  <launcherArgs>\n");
            write_text_elem(&mut out, "programArgs", args.program_args.as_deref());
            write_text_elem(&mut out, "vmArgs", args.vm_args.as_deref());
            out.push_str("  </launcherArgs>\n");
        }

        if let Some(plugins) = &self.include_bundles {
            out.push_str("  <includeBundles>\n");
            for plugin in plugins {
                out.push_str(&format!("    <plugin id=\"{}\"", escape(&plugin.id)));
                push_attr(&mut out, "version", plugin.version.as_deref());
                out.push_str("/>\n");
            }
            out.push_str("  </includeBundles>\n");
        }

        out.push_str("</target>\n");
        out
    }
}

fn parse_location(node: &Node) -> Result<Location> {
    let repository = node
        .children()
        .find(|n| n.has_tag_name("repository"))
        .and_then(|n| n.attribute("location"))
        .context("<location> is missing <repository location=..>")?
        .to_string();

    let units = node
        .children()
        .filter(|n| n.has_tag_name("unit"))
        .map(|u| Unit {
            id: u.attribute("id").unwrap_or_default().to_string(),
            version: u.attribute("version").unwrap_or_default().to_string(),
        })
        .collect();

    Ok(Location {
        include_mode: attr(node, "includeMode"),
        location_type: attr(node, "type"),
        include_all_platforms: attr(node, "includeAllPlatforms"),
        include_configure_phase: attr(node, "includeConfigurePhase"),
        repository,
        units,
    })
}

fn write_location(out: &mut String, location: &Location) {
    out.push_str("    <location");
    push_attr(out, "includeAllPlatforms", location.include_all_platforms.as_deref());
    push_attr(out, "includeConfigurePhase", location.include_configure_phase.as_deref());
    push_attr(out, "includeMode", location.include_mode.as_deref());
    push_attr(out, "type", location.location_type.as_deref());
    out.push_str(">\n");
    out.push_str(&format!(
        "      <repository location=\"{}\"/>\n",
        escape(&location.repository)
    ));
    for unit in &location.units {
        out.push_str(&format!(
            "      <unit id=\"{}\" version=\"{}\"/>\n",
            escape(&unit.id),
            escape(&unit.version)
        ));
    }
    out.push_str("    </location>\n");
}

fn write_text_elem(out: &mut String, name: &str, value: Option<&str>) {
    if let Some(value) = value {
        out.push_str(&format!("    <{name}>{}</{name}>\n", escape(value)));
    }
}

fn push_attr(out: &mut String, name: &str, value: Option<&str>) {
    if let Some(value) = value {
        out.push_str(&format!(" {name}=\"{}\"", escape(value)));
    }
}

fn attr(node: &Node, name: &str) -> Option<String> {
    node.attribute(name).map(str::to_string)
}

fn elem_text(node: &Node, name: &str) -> Option<String> {
    node.children()
        .find(|n| n.has_tag_name(name))
        .and_then(|n| n.text())
        .map(str::to_string)
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
