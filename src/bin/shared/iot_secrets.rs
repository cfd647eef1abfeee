//! IoT endpoint and device TLS material, rendered by the project generator.
//! Demo credentials; not for production use.

use sensordemo_core::config::IotSecrets;

pub const IOT_SECRETS: IotSecrets = IotSecrets {
    endpoint: "{{ iot_endpoint }}",
    root_ca: r"
{{ simpleiot_root_ca }}
",
    device_cert: r"
{{ simpleiot_device_cert }}
",
    private_key: r"
{{ simpleiot_private_key }}
",
};
