//! Plain text diagnostic report for species and their organisms.
//!
//! The framing lines here are a stable interchange format consumed by
//! downstream tooling; genome bodies are delegated to the collaborator's
//! [`Genome::write_plain`].

use crate::genome::Genome;
use crate::species::Species;
use std::io;

/// Write one species block: a species summary comment, then one comment per
/// organism (with a winner marker where earned) followed by its genome dump.
pub fn write_species<G: Genome, W: io::Write>(species: &Species<G>, w: &mut W) -> io::Result<()> {
    writeln!(
        w,
        "/* Species #{} : (Size {}) (AF {:.3}) (Age {})  */",
        species.id,
        species.size(),
        species.avg_fitness,
        species.age
    )?;

    for org in &species.organisms {
        writeln!(
            w,
            "/* Organism #{} Fitness: {:.3} Error: {:.3} */",
            org.genome.id(),
            org.fitness,
            org.error
        )?;
        if org.is_winner {
            writeln!(
                w,
                "/* ##------$ WINNER {} SPECIES # {} $------## */",
                org.genome.id(),
                species.id
            )?;
        }
        org.genome.write_plain(w)?;
    }
    Ok(())
}

/// Write every species of a population in list order.
pub fn write_population<G: Genome, W: io::Write>(
    species_list: &[Species<G>],
    w: &mut W,
) -> io::Result<()> {
    for species in species_list {
        write_species(species, w)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::stub::StubGenome;
    use crate::organism::Organism;

    fn report_for(species: &Species<StubGenome>) -> String {
        let mut buf = Vec::new();
        write_species(species, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn species_block_matches_expected_framing() {
        let mut species = Species::new(3);
        species.age = 4;
        species.avg_fitness = 1.2345;
        let mut org = Organism::new(0.5, StubGenome::new(11, 0.25), 1);
        org.error = 0.125;
        species.add_organism(org);

        let expected = "\
/* Species #3 : (Size 1) (AF 1.234) (Age 4)  */
/* Organism #11 Fitness: 0.500 Error: 0.125 */
genomestart 11
tag 0.250
genomeend 11
";
        assert_eq!(report_for(&species), expected);
    }

    #[test]
    fn winner_marker_follows_the_organism_comment() {
        let mut species = Species::new(9);
        let mut org = Organism::new(1.0, StubGenome::new(2, 0.0), 1);
        org.is_winner = true;
        species.add_organism(org);

        let report = report_for(&species);
        let organism_line = report
            .lines()
            .position(|l| l.starts_with("/* Organism #2"))
            .unwrap();
        assert_eq!(
            report.lines().nth(organism_line + 1).unwrap(),
            "/* ##------$ WINNER 2 SPECIES # 9 $------## */"
        );
    }

    #[test]
    fn population_report_concatenates_species_blocks() {
        let mut a = Species::new(1);
        a.add_organism(Organism::new(0.0, StubGenome::new(1, 0.0), 1));
        let mut b = Species::new(2);
        b.add_organism(Organism::new(0.0, StubGenome::new(2, 0.0), 1));

        let mut buf = Vec::new();
        write_population(&[a, b], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("/* Species #1"));
        assert!(text.contains("/* Species #2"));
        assert!(text.find("/* Species #1").unwrap() < text.find("/* Species #2").unwrap());
    }
}
