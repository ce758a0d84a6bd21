use crate::areas::refs::RefNode;
use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// List every reference with its object ID, `refs/...` paths sorted.
    pub fn show_ref(&self) -> anyhow::Result<()> {
        let listing = self.refs().list(None)?;
        self.print_ref_node(&listing, "refs", true)
    }

    pub(crate) fn print_ref_node(
        &self,
        node: &RefNode,
        prefix: &str,
        with_hash: bool,
    ) -> anyhow::Result<()> {
        match node {
            RefNode::Direct(oid) => {
                if with_hash {
                    writeln!(self.writer(), "{oid} {prefix}")?;
                } else {
                    writeln!(self.writer(), "{prefix}")?;
                }
            }
            RefNode::Group(children) => {
                for (name, child) in children {
                    self.print_ref_node(child, &format!("{prefix}/{name}"), with_hash)?;
                }
            }
        }

        Ok(())
    }
}
