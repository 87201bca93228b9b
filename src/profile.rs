//! Call-graph profile snapshot
//!
//! The exporter only reads profiles. A profile holds one [`ThreadProfile`] per
//! profiled thread; each thread owns its methods and the call edges between
//! them, and methods refer to edges (and edges to methods) by index.

use crate::error::{ExportError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub type MethodIndex = usize;
pub type EdgeIndex = usize;

/// Profile result for every profiled thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileResult {
    /// Measurement mode label the profile was collected with (e.g. "wall_time")
    pub measure_mode: String,
    /// Threads in profiling order
    pub threads: Vec<ThreadProfile>,
}

/// Methods and call edges recorded for one thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadProfile {
    pub id: u64,
    pub methods: Vec<MethodInfo>,
    #[serde(default)]
    pub call_edges: Vec<CallEdge>,
}

/// A profiled method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodInfo {
    /// Qualified name (e.g. "Object#foo")
    pub full_name: String,
    /// Declared source file, possibly relative
    pub source_file: PathBuf,
    /// Declared source line
    pub line: u32,
    /// Time attributed to the method's own body
    pub self_time: f64,
    /// Self time plus callee time
    pub total_time: f64,
    /// Outgoing edges, in call order
    #[serde(default)]
    pub children: Vec<EdgeIndex>,
    /// Incoming edges, one per calling context
    #[serde(default)]
    pub call_infos: Vec<EdgeIndex>,
}

/// A directed, weighted call from `caller` to `target`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallEdge {
    pub target: MethodIndex,
    /// Absent for a root-level invocation
    #[serde(default)]
    pub caller: Option<MethodIndex>,
    /// Number of calls
    pub called: u64,
    /// Call-site line
    pub line: u32,
    pub total_time: f64,
    /// Method names from the profiling root to this edge, joined by "->"
    pub call_sequence: String,
}

impl ProfileResult {
    pub fn new(measure_mode: impl Into<String>) -> Self {
        Self {
            measure_mode: measure_mode.into(),
            threads: Vec::new(),
        }
    }

    /// Parse a JSON profile snapshot and validate it
    pub fn from_json_str(json: &str) -> Result<Self> {
        let profile: ProfileResult = serde_json::from_str(json)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Load a JSON profile snapshot from disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    /// Check every thread's index references and edge endpoints
    pub fn validate(&self) -> Result<()> {
        for thread in &self.threads {
            thread.validate()?;
        }
        Ok(())
    }
}

impl ThreadProfile {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            methods: Vec::new(),
            call_edges: Vec::new(),
        }
    }

    /// Append a method with no edges yet
    pub fn add_method(
        &mut self,
        full_name: impl Into<String>,
        source_file: impl Into<PathBuf>,
        line: u32,
        self_time: f64,
        total_time: f64,
    ) -> MethodIndex {
        self.methods.push(MethodInfo {
            full_name: full_name.into(),
            source_file: source_file.into(),
            line,
            self_time,
            total_time,
            children: Vec::new(),
            call_infos: Vec::new(),
        });
        self.methods.len() - 1
    }

    /// Append a call edge and register it on both endpoints
    ///
    /// # Panics
    ///
    /// Panics if `caller` or `target` is not a method of this thread.
    pub fn add_call(
        &mut self,
        caller: Option<MethodIndex>,
        target: MethodIndex,
        called: u64,
        line: u32,
        total_time: f64,
        call_sequence: impl Into<String>,
    ) -> EdgeIndex {
        let index = self.call_edges.len();
        self.call_edges.push(CallEdge {
            target,
            caller,
            called,
            line,
            total_time,
            call_sequence: call_sequence.into(),
        });
        if let Some(caller) = caller {
            self.methods[caller].children.push(index);
        }
        self.methods[target].call_infos.push(index);
        index
    }

    pub fn method(&self, index: MethodIndex) -> &MethodInfo {
        &self.methods[index]
    }

    pub fn edge(&self, index: EdgeIndex) -> &CallEdge {
        &self.call_edges[index]
    }

    /// Outgoing edges of `method`, in call order
    pub fn children<'a>(&'a self, method: &'a MethodInfo) -> impl Iterator<Item = &'a CallEdge> {
        method.children.iter().map(move |&e| self.edge(e))
    }

    /// Incoming edges of `method`
    pub fn call_infos<'a>(
        &'a self,
        method: &'a MethodInfo,
    ) -> impl Iterator<Item = &'a CallEdge> {
        method.call_infos.iter().map(move |&e| self.edge(e))
    }

    /// Largest total time of any method, i.e. the time under the thread's root
    pub fn total_time(&self) -> f64 {
        self.methods
            .iter()
            .map(|m| m.total_time)
            .fold(0.0, f64::max)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| ExportError::InvalidProfile(format!("thread {}: {}", self.id, msg));

        for (i, edge) in self.call_edges.iter().enumerate() {
            if edge.target >= self.methods.len() {
                return Err(invalid(format!(
                    "edge {} targets unknown method {}",
                    i, edge.target
                )));
            }
            if let Some(caller) = edge.caller {
                if caller >= self.methods.len() {
                    return Err(invalid(format!(
                        "edge {} has unknown caller {}",
                        i, caller
                    )));
                }
            }
            if !edge.total_time.is_finite() {
                return Err(invalid(format!("edge {} has non-finite total time", i)));
            }
        }

        for (i, method) in self.methods.iter().enumerate() {
            if !method.self_time.is_finite() || !method.total_time.is_finite() {
                return Err(invalid(format!(
                    "method {} ({}) has non-finite time",
                    i, method.full_name
                )));
            }
            for &e in &method.children {
                match self.call_edges.get(e) {
                    Some(edge) if edge.caller == Some(i) => {}
                    Some(_) => {
                        return Err(invalid(format!(
                            "edge {} is a child of {} but not called from it",
                            e, method.full_name
                        )))
                    }
                    None => {
                        return Err(invalid(format!(
                            "method {} lists unknown child edge {}",
                            method.full_name, e
                        )))
                    }
                }
            }
            for &e in &method.call_infos {
                match self.call_edges.get(e) {
                    Some(edge) if edge.target == i => {}
                    Some(_) => {
                        return Err(invalid(format!(
                            "edge {} is a call info of {} but does not target it",
                            e, method.full_name
                        )))
                    }
                    None => {
                        return Err(invalid(format!(
                            "method {} lists unknown call info edge {}",
                            method.full_name, e
                        )))
                    }
                }
            }
        }

        Ok(())
    }
}
