use std::io::BufRead;

use super::StatParseError;

/// Counters for one interface from `/proc/<pid>/net/dev`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterfaceStat {
    pub name: String,
    pub rx_bytes: u64,
    pub rx_packets: u64,
    pub tx_bytes: u64,
    pub tx_packets: u64,
}

const IGNORED_INTERFACES: [&str; 1] = ["lo"];

/// Number of whitespace-separated counters following the interface name.
const FIELD_COUNT: usize = 16;

/// Per-interface statistics of one network namespace, in file order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetworkStat {
    pub interfaces: Vec<InterfaceStat>,
}

impl NetworkStat {
    /// Parses a `/proc/<pid>/net/dev` file.
    ///
    /// The two header lines are skipped, loopback interfaces are ignored and
    /// lines with fewer than 16 counters are dropped.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if reading fails or a counter is not a number.
    pub fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        let mut stat = NetworkStat::default();
        let mut line = String::new();

        for _ in 0..2 {
            buf.read_line(&mut line)?;
            line.clear();
        }

        let mut lineno = 2;
        while buf.read_line(&mut line)? != 0 {
            lineno += 1;
            if let Some((iface, data)) = line.trim().split_once(':') {
                let iface = iface.trim();
                let fields: Vec<&str> = data.split_whitespace().collect();
                if !IGNORED_INTERFACES.contains(&iface) && fields.len() >= FIELD_COUNT {
                    let field = |i: usize| {
                        fields[i]
                            .parse::<u64>()
                            .map_err(|source| StatParseError::InvalidValue {
                                value: fields[i].to_string(),
                                line: lineno,
                                source,
                            })
                    };
                    stat.interfaces.push(InterfaceStat {
                        name: iface.to_owned(),
                        rx_bytes: field(0)?,
                        rx_packets: field(1)?,
                        tx_bytes: field(8)?,
                        tx_packets: field(9)?,
                    });
                }
            }
            line.clear();
        }

        Ok(stat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
";

    #[test]
    fn test_only_headers() {
        let stat = NetworkStat::from_reader(&mut HEADER.as_bytes()).unwrap();
        assert!(stat.interfaces.is_empty());
    }

    #[test]
    fn test_parse_interfaces_skips_loopback() {
        let data = format!(
            "{HEADER}\
    lo: 422198341   75815    0    0    0     0          0         0 422198341   75815    0    0    0     0       0          0
  eth0: 10240    100     0    0    0     0          0         0  20480   200     0    0    0     0       0          0
  eth1: 10 20 0 0 0 0 0 0 30 40 0 0 0 0 0 0
"
        );
        let stat = NetworkStat::from_reader(&mut data.as_bytes()).unwrap();
        assert_eq!(
            stat.interfaces,
            vec![
                InterfaceStat {
                    name: "eth0".to_owned(),
                    rx_bytes: 10240,
                    rx_packets: 100,
                    tx_bytes: 20480,
                    tx_packets: 200,
                },
                InterfaceStat {
                    name: "eth1".to_owned(),
                    rx_bytes: 10,
                    rx_packets: 20,
                    tx_bytes: 30,
                    tx_packets: 40,
                },
            ]
        );
    }

    #[test]
    fn test_short_line_is_dropped() {
        let data = format!("{HEADER} badif: 123 456\n");
        let stat = NetworkStat::from_reader(&mut data.as_bytes()).unwrap();
        assert!(stat.interfaces.is_empty());
    }

    #[test]
    fn test_unparsable_counter_is_an_error() {
        let data = format!("{HEADER}  eth0: xyz 1 0 0 0 0 0 0 2 3 0 0 0 0 0 0\n");
        let err = NetworkStat::from_reader(&mut data.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}
