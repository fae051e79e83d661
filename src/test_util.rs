use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch directory for fixture files; removed when dropped.
pub struct Fixtures {
    dir: TempDir,
}

impl Fixtures {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Write a metagene profile table: `(fragment_length, offset_5p, profile, phase_score)`
    pub fn metagene(&self, name: &str, rows: &[(u32, i64, &str, Option<f64>)]) -> PathBuf {
        let mut content = String::from("fragment_length\toffset_5p\tprofile\tphase_score\tvalid_codons\n");
        for (length, offset, profile, score) in rows {
            let score = score.map(|s| s.to_string()).unwrap_or_default();
            content.push_str(&format!("{}\t{}\t{}\t{}\t100\n", length, offset, profile, score));
        }
        self.write(name, &content)
    }

    /// Write a bam summary with a fixed summary block and the given histogram
    pub fn bam_summary(&self, name: &str, lengths: &[(u32, u64)]) -> PathBuf {
        let mut content = String::from("summary:\ntotal reads: 1000\nunique reads: 800\nlength dist:\n");
        for (length, count) in lengths {
            content.push_str(&format!("{}: {}\n", length, count));
        }
        self.write(name, &content)
    }

    /// Write a project manifest: `(sample, metagene_5p, bam_summary)`
    pub fn manifest(&self, name: &str, rows: &[(&str, Option<&Path>, Option<&Path>)]) -> PathBuf {
        let mut content = String::from(
            "study_accession\texperiment_accession\trun_accession\tribotricer_orfs\tribotricer_metagene_5p\tribotricer_metagene_3p\tribotricer_bam_summary\tribotricer_protocol\n",
        );
        for (i, (sample, metagene, bam)) in rows.iter().enumerate() {
            let show = |p: &Option<&Path>| p.map(|p| p.display().to_string()).unwrap_or_default();
            content.push_str(&format!(
                "SRP000001\t{}\tSRR{:06}\t\t{}\t\t{}\t\n",
                sample,
                i + 1,
                show(metagene),
                show(bam)
            ));
        }
        self.write(name, &content)
    }
}
